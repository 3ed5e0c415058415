//! Post repository contract, SQLite implementation and relation loading.
//!
//! # Responsibility
//! - Provide post CRUD on top of the `posts` table.
//! - Own relation loading in both directions (user has-many posts, post
//!   belongs-to user).
//!
//! # Invariants
//! - Has-many loading applies the child's soft-delete visibility rule.
//! - Belongs-to loading bypasses the parent's visibility filter: the foreign
//!   key already fixed the target identity.
//! - `posts.user_id` integrity is enforced by the engine (foreign_keys=ON).

use crate::model::post::Post;
use crate::model::user::User;
use crate::model::RecordId;
use crate::repo::query::{append_filters, append_order_and_page, ListQuery};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{
    bool_to_int, ensure_schema_ready, ensure_table_ready, write_error, DeleteMode, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const POST_SELECT_SQL: &str = "SELECT
    id,
    title,
    body,
    user_id,
    created_at,
    updated_at,
    deleted_at
FROM posts";

const POST_COLUMNS: &[&str] = &[
    "id",
    "title",
    "body",
    "user_id",
    "created_at",
    "updated_at",
    "deleted_at",
];

/// Partial update for a post; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Repository interface for post CRUD and relation loading.
pub trait PostRepository {
    /// Inserts one post; populates its generated id and timestamps. Fails
    /// with a constraint violation when `user_id` references no users row.
    fn create_post(&self, post: &mut Post) -> RepoResult<RecordId>;
    /// Inserts a batch, best effort: stops at the first error, earlier rows
    /// stay persisted.
    fn create_posts(&self, posts: &mut [Post]) -> RepoResult<()>;
    /// Gets one post by id with explicit deleted-row visibility.
    fn get_post(&self, id: RecordId, include_deleted: bool) -> RepoResult<Option<Post>>;
    /// Lists posts using filter, order and pagination options.
    fn list_posts(&self, query: &ListQuery) -> RepoResult<Vec<Post>>;
    /// Full replacement: every payload field overwrites, zero values included.
    fn update_post(&self, post: &Post) -> RepoResult<()>;
    /// Partial patch: only named fields overwrite.
    fn patch_post(&self, id: RecordId, patch: &PostPatch) -> RepoResult<()>;
    /// Removes a post, tombstoning or permanently per `mode`.
    fn delete_post(&self, id: RecordId, mode: DeleteMode) -> RepoResult<()>;
    /// Clears the tombstone of a soft-deleted post.
    fn restore_post(&self, id: RecordId) -> RepoResult<()>;
    /// Has-many: children of one user in creation order, with explicit
    /// deleted-row visibility.
    fn posts_for_user(&self, user_id: RecordId, include_deleted: bool) -> RepoResult<Vec<Post>>;
    /// Belongs-to: the owning user, soft-deleted parents included. `None`
    /// only when the parent row was hard-deleted.
    fn author_for_post(&self, post: &Post) -> RepoResult<Option<User>>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let _ = SqliteUserRepository::try_new(conn)?;
        ensure_schema_ready(conn)?;
        ensure_table_ready(conn, "posts", POST_COLUMNS)?;
        Ok(Self { conn })
    }

    fn row_exists(&self, id: RecordId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, post: &mut Post) -> RepoResult<RecordId> {
        post.validate()?;

        self.conn
            .execute(
                "INSERT INTO posts (title, body, user_id) VALUES (?1, ?2, ?3);",
                params![post.title.as_str(), post.body.as_str(), post.user_id],
            )
            .map_err(|err| write_error("post", err))?;

        post.id = self.conn.last_insert_rowid();
        let (created_at, updated_at) = self.conn.query_row(
            "SELECT created_at, updated_at FROM posts WHERE id = ?1;",
            [post.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        post.created_at = created_at;
        post.updated_at = updated_at;
        post.deleted_at = None;

        Ok(post.id)
    }

    fn create_posts(&self, posts: &mut [Post]) -> RepoResult<()> {
        for post in posts.iter_mut() {
            self.create_post(post)?;
        }
        Ok(())
    }

    fn get_post(&self, id: RecordId, include_deleted: bool) -> RepoResult<Option<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR deleted_at IS NULL);"
        ))?;

        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }

        Ok(None)
    }

    fn list_posts(&self, query: &ListQuery) -> RepoResult<Vec<Post>> {
        let mut sql = format!("{POST_SELECT_SQL} WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }
        append_filters(&mut sql, &mut binds, &query.filters, "posts", POST_COLUMNS)?;
        append_order_and_page(&mut sql, &mut binds, query, "posts", POST_COLUMNS)?;

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut posts = Vec::new();

        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }

        Ok(posts)
    }

    fn update_post(&self, post: &Post) -> RepoResult<()> {
        post.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE posts
                 SET
                    title = ?1,
                    body = ?2,
                    user_id = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?4
                   AND deleted_at IS NULL;",
                params![
                    post.title.as_str(),
                    post.body.as_str(),
                    post.user_id,
                    post.id
                ],
            )
            .map_err(|err| write_error("post", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "post",
                id: post.id,
            });
        }

        Ok(())
    }

    fn patch_post(&self, id: RecordId, patch: &PostPatch) -> RepoResult<()> {
        let mut sql = String::from("UPDATE posts SET ");
        let mut binds: Vec<Value> = Vec::new();

        if let Some(title) = &patch.title {
            Post::validate_title(title)?;
            sql.push_str("title = ?, ");
            binds.push(Value::Text(title.clone()));
        }
        if let Some(body) = &patch.body {
            sql.push_str("body = ?, ");
            binds.push(Value::Text(body.clone()));
        }

        sql.push_str(
            "updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?
               AND deleted_at IS NULL;",
        );
        binds.push(Value::Integer(id));

        let changed = self
            .conn
            .execute(&sql, params_from_iter(binds))
            .map_err(|err| write_error("post", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "post", id });
        }

        Ok(())
    }

    fn delete_post(&self, id: RecordId, mode: DeleteMode) -> RepoResult<()> {
        match mode {
            DeleteMode::Hard => {
                let changed = self
                    .conn
                    .execute("DELETE FROM posts WHERE id = ?1;", [id])
                    .map_err(|err| write_error("post", err))?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: "post", id });
                }
                Ok(())
            }
            DeleteMode::Soft => {
                let changed = self.conn.execute(
                    "UPDATE posts
                     SET deleted_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1
                       AND deleted_at IS NULL;",
                    [id],
                )?;
                if changed == 0 && !self.row_exists(id)? {
                    return Err(RepoError::NotFound { entity: "post", id });
                }
                Ok(())
            }
        }
    }

    fn restore_post(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE posts
                 SET
                    deleted_at = NULL,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                   AND deleted_at IS NOT NULL;",
                [id],
            )
            .map_err(|err| write_error("post", err))?;

        if changed == 0 && !self.row_exists(id)? {
            return Err(RepoError::NotFound { entity: "post", id });
        }

        Ok(())
    }

    fn posts_for_user(&self, user_id: RecordId, include_deleted: bool) -> RepoResult<Vec<Post>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_SELECT_SQL}
             WHERE user_id = ?1
               AND (?2 = 1 OR deleted_at IS NULL)
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query(params![user_id, bool_to_int(include_deleted)])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }

        Ok(posts)
    }

    fn author_for_post(&self, post: &Post) -> RepoResult<Option<User>> {
        let users = SqliteUserRepository::try_new(self.conn)?;
        users.get_user(post.user_id, true)
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let post = Post {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    };
    post.validate()?;
    Ok(post)
}
