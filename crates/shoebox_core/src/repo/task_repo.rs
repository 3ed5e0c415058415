//! Task repository contract and SQLite implementation.
//!
//! Tasks have no tombstone column, so this repository has no visibility
//! parameters and a soft delete request degrades to hard removal.

use crate::model::task::Task;
use crate::model::RecordId;
use crate::repo::query::{append_filters, append_order_and_page, ListQuery};
use crate::repo::{
    bool_to_int, ensure_schema_ready, ensure_table_ready, write_error, DeleteMode, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    description,
    done,
    created_at,
    updated_at
FROM tasks";

const TASK_COLUMNS: &[&str] = &["id", "description", "done", "created_at", "updated_at"];

/// Partial update for a task; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub done: Option<bool>,
}

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Inserts one task; populates its generated id and timestamps.
    fn create_task(&self, task: &mut Task) -> RepoResult<RecordId>;
    /// Inserts a batch, best effort: stops at the first error, earlier rows
    /// stay persisted.
    fn create_tasks(&self, tasks: &mut [Task]) -> RepoResult<()>;
    /// Gets one task by id.
    fn get_task(&self, id: RecordId) -> RepoResult<Option<Task>>;
    /// Lists tasks using filter, order and pagination options. The query's
    /// `include_deleted` flag has no effect here.
    fn list_tasks(&self, query: &ListQuery) -> RepoResult<Vec<Task>>;
    /// Full replacement: every payload field overwrites, zero values included.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    /// Partial patch: only named fields overwrite.
    fn patch_task(&self, id: RecordId, patch: &TaskPatch) -> RepoResult<()>;
    /// Removes a task. Both modes remove the row permanently.
    fn delete_task(&self, id: RecordId, mode: DeleteMode) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        ensure_table_ready(conn, "tasks", TASK_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &mut Task) -> RepoResult<RecordId> {
        task.validate()?;

        self.conn
            .execute(
                "INSERT INTO tasks (description, done) VALUES (?1, ?2);",
                params![task.description.as_str(), bool_to_int(task.done)],
            )
            .map_err(|err| write_error("task", err))?;

        task.id = self.conn.last_insert_rowid();
        let (created_at, updated_at) = self.conn.query_row(
            "SELECT created_at, updated_at FROM tasks WHERE id = ?1;",
            [task.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        task.created_at = created_at;
        task.updated_at = updated_at;

        Ok(task.id)
    }

    fn create_tasks(&self, tasks: &mut [Task]) -> RepoResult<()> {
        for task in tasks.iter_mut() {
            self.create_task(task)?;
        }
        Ok(())
    }

    fn get_task(&self, id: RecordId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &ListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();

        append_filters(&mut sql, &mut binds, &query.filters, "tasks", TASK_COLUMNS)?;
        append_order_and_page(&mut sql, &mut binds, query, "tasks", TASK_COLUMNS)?;

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE tasks
                 SET
                    description = ?1,
                    done = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?3;",
                params![task.description.as_str(), bool_to_int(task.done), task.id],
            )
            .map_err(|err| write_error("task", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.id,
            });
        }

        Ok(())
    }

    fn patch_task(&self, id: RecordId, patch: &TaskPatch) -> RepoResult<()> {
        let mut sql = String::from("UPDATE tasks SET ");
        let mut binds: Vec<Value> = Vec::new();

        if let Some(description) = &patch.description {
            Task::validate_description(description)?;
            sql.push_str("description = ?, ");
            binds.push(Value::Text(description.clone()));
        }
        if let Some(done) = patch.done {
            sql.push_str("done = ?, ");
            binds.push(Value::Integer(bool_to_int(done)));
        }

        sql.push_str(
            "updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?;",
        );
        binds.push(Value::Integer(id));

        let changed = self
            .conn
            .execute(&sql, params_from_iter(binds))
            .map_err(|err| write_error("task", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }

        Ok(())
    }

    fn delete_task(&self, id: RecordId, _mode: DeleteMode) -> RepoResult<()> {
        // No deleted_at column to set: Soft and Hard both remove the row.
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id])
            .map_err(|err| write_error("task", err))?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "task", id });
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let done = match row.get::<_, i64>("done")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid done value `{other}` in tasks.done"
            )));
        }
    };

    let task = Task {
        id: row.get("id")?,
        description: row.get("description")?,
        done,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    task.validate()?;
    Ok(task)
}
