//! Record store facade.
//!
//! # Responsibility
//! - Provide one readiness-checked entry point over all repositories.
//! - Compose relation-loading use cases.
//!
//! # Invariants
//! - The facade never bypasses repository validation/persistence contracts.
//! - The connection is borrowed, never owned: acquisition and release stay
//!   with the caller's scope.

use crate::model::post::Post;
use crate::model::user::User;
use crate::model::RecordId;
use crate::repo::post_repo::{PostRepository, SqlitePostRepository};
use crate::repo::product_repo::SqliteProductRepository;
use crate::repo::task_repo::SqliteTaskRepository;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use rusqlite::Connection;

/// Read model pairing a user with its loaded posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithPosts {
    pub user: User,
    /// Active posts in creation order.
    pub posts: Vec<Post>,
}

/// Facade bundling the per-entity repositories over one shared connection.
pub struct RecordStore<'conn> {
    products: SqliteProductRepository<'conn>,
    users: SqliteUserRepository<'conn>,
    posts: SqlitePostRepository<'conn>,
    tasks: SqliteTaskRepository<'conn>,
}

impl<'conn> RecordStore<'conn> {
    /// Constructs the facade from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            products: SqliteProductRepository::try_new(conn)?,
            users: SqliteUserRepository::try_new(conn)?,
            posts: SqlitePostRepository::try_new(conn)?,
            tasks: SqliteTaskRepository::try_new(conn)?,
        })
    }

    pub fn products(&self) -> &SqliteProductRepository<'conn> {
        &self.products
    }

    pub fn users(&self) -> &SqliteUserRepository<'conn> {
        &self.users
    }

    pub fn posts(&self) -> &SqlitePostRepository<'conn> {
        &self.posts
    }

    pub fn tasks(&self) -> &SqliteTaskRepository<'conn> {
        &self.tasks
    }

    /// Loads one active user together with its active posts.
    ///
    /// Returns `None` when the user is absent or soft-deleted, matching the
    /// default read visibility rule.
    pub fn user_with_posts(&self, id: RecordId) -> RepoResult<Option<UserWithPosts>> {
        let Some(user) = self.users.get_user(id, false)? else {
            return Ok(None);
        };
        let posts = self.posts.posts_for_user(id, false)?;
        Ok(Some(UserWithPosts { user, posts }))
    }
}
