//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths must run model validation before SQL mutations.
//! - `email` uniqueness only binds among non-tombstoned rows.
//! - Soft delete is idempotent and preserves the original tombstone time.

use crate::model::user::User;
use crate::model::RecordId;
use crate::repo::query::{append_filters, append_order_and_page, ListQuery};
use crate::repo::{
    bool_to_int, ensure_schema_ready, ensure_table_ready, write_error, DeleteMode, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    created_at,
    updated_at,
    deleted_at
FROM users";

const USER_COLUMNS: &[&str] = &["id", "name", "email", "created_at", "updated_at", "deleted_at"];

/// Partial update for a user; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Inserts one user; populates its generated id and timestamps.
    fn create_user(&self, user: &mut User) -> RepoResult<RecordId>;
    /// Inserts a batch, best effort: stops at the first error, earlier rows
    /// stay persisted.
    fn create_users(&self, users: &mut [User]) -> RepoResult<()>;
    /// Gets one user by id with explicit deleted-row visibility.
    fn get_user(&self, id: RecordId, include_deleted: bool) -> RepoResult<Option<User>>;
    /// Lists users using filter, order and pagination options.
    fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>>;
    /// Full replacement: every payload field overwrites, zero values included.
    fn update_user(&self, user: &User) -> RepoResult<()>;
    /// Partial patch: only named fields overwrite.
    fn patch_user(&self, id: RecordId, patch: &UserPatch) -> RepoResult<()>;
    /// Removes a user, tombstoning or permanently per `mode`. A hard delete
    /// of a user that still owns posts fails the engine's FK check.
    fn delete_user(&self, id: RecordId, mode: DeleteMode) -> RepoResult<()>;
    /// Clears the tombstone of a soft-deleted user.
    fn restore_user(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        ensure_table_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }

    fn row_exists(&self, id: RecordId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &mut User) -> RepoResult<RecordId> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (name, email) VALUES (?1, ?2);",
                params![user.name.as_str(), user.email.as_str()],
            )
            .map_err(|err| write_error("user", err))?;

        user.id = self.conn.last_insert_rowid();
        let (created_at, updated_at) = self.conn.query_row(
            "SELECT created_at, updated_at FROM users WHERE id = ?1;",
            [user.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        user.created_at = created_at;
        user.updated_at = updated_at;
        user.deleted_at = None;

        Ok(user.id)
    }

    fn create_users(&self, users: &mut [User]) -> RepoResult<()> {
        for user in users.iter_mut() {
            self.create_user(user)?;
        }
        Ok(())
    }

    fn get_user(&self, id: RecordId, include_deleted: bool) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR deleted_at IS NULL);"
        ))?;

        let mut rows = stmt.query(params![id, bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }
        append_filters(&mut sql, &mut binds, &query.filters, "users", USER_COLUMNS)?;
        append_order_and_page(&mut sql, &mut binds, query, "users", USER_COLUMNS)?;

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    name = ?1,
                    email = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?3
                   AND deleted_at IS NULL;",
                params![user.name.as_str(), user.email.as_str(), user.id],
            )
            .map_err(|err| write_error("user", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.id,
            });
        }

        Ok(())
    }

    fn patch_user(&self, id: RecordId, patch: &UserPatch) -> RepoResult<()> {
        let mut sql = String::from("UPDATE users SET ");
        let mut binds: Vec<Value> = Vec::new();

        if let Some(name) = &patch.name {
            User::validate_name(name)?;
            sql.push_str("name = ?, ");
            binds.push(Value::Text(name.clone()));
        }
        if let Some(email) = &patch.email {
            User::validate_email(email)?;
            sql.push_str("email = ?, ");
            binds.push(Value::Text(email.clone()));
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
            .map_err(|err| write_error("user", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        Ok(())
    }

    fn delete_user(&self, id: RecordId, mode: DeleteMode) -> RepoResult<()> {
        match mode {
            DeleteMode::Hard => {
                let changed = self
                    .conn
                    .execute("DELETE FROM users WHERE id = ?1;", [id])
                    .map_err(|err| write_error("user", err))?;
                if changed == 0 {
                    return Err(RepoError::NotFound { entity: "user", id });
                }
                Ok(())
            }
            DeleteMode::Soft => {
                let changed = self.conn.execute(
                    "UPDATE users
                     SET deleted_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1
                       AND deleted_at IS NULL;",
                    [id],
                )?;
                if changed == 0 && !self.row_exists(id)? {
                    return Err(RepoError::NotFound { entity: "user", id });
                }
                Ok(())
            }
        }
    }

    fn restore_user(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    deleted_at = NULL,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                   AND deleted_at IS NOT NULL;",
                [id],
            )
            .map_err(|err| write_error("user", err))?;

        if changed == 0 && !self.row_exists(id)? {
            return Err(RepoError::NotFound { entity: "user", id });
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    };
    user.validate()?;
    Ok(user)
}
