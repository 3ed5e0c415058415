//! Soft-delete-aware record store over a local SQLite file.
//! This crate is the single source of truth for record lifecycle invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::post::Post;
pub use model::product::Product;
pub use model::task::Task;
pub use model::user::User;
pub use model::{RecordId, RecordValidationError};
pub use repo::post_repo::{PostPatch, PostRepository, SqlitePostRepository};
pub use repo::product_repo::{ProductPatch, ProductRepository, SqliteProductRepository};
pub use repo::query::{Direction, Filter, FilterOp, ListQuery, Ordering};
pub use repo::task_repo::{SqliteTaskRepository, TaskPatch, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserPatch, UserRepository};
pub use repo::{DeleteMode, RepoError, RepoResult};
pub use service::record_store::{RecordStore, UserWithPosts};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
