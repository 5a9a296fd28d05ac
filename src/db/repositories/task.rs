use anyhow::{Context, Result};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Statement, Value,
};
use tracing::{debug, info};

use crate::models::task::Task;
use crate::services::task_store::TaskStore;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    done BOOLEAN NOT NULL DEFAULT 0
)";

#[derive(Debug, FromQueryResult)]
struct TaskRow {
    id: i64,
    text: String,
    done: bool,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            done: row.done,
        }
    }
}

/// `tasks` table access with hand-written SQL.
pub struct TaskRepository {
    conn: DatabaseConnection,
}

impl TaskRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates the `tasks` table if this is a fresh database.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute(Statement::from_string(self.backend(), CREATE_TABLE))
            .await
            .context("Failed to create tasks table")?;
        Ok(())
    }

    fn backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    fn statement<I>(&self, sql: &str, values: I) -> Statement
    where
        I: IntoIterator<Item = Value>,
    {
        Statement::from_sql_and_values(self.backend(), sql, values)
    }

    async fn find(&self, id: i64) -> Result<Option<Task>> {
        let row = TaskRow::find_by_statement(self.statement(
            "SELECT id, text, done FROM tasks WHERE id = ?",
            [id.into()],
        ))
        .one(&self.conn)
        .await
        .context("Failed to query task")?;

        Ok(row.map(Task::from))
    }
}

#[async_trait::async_trait]
impl TaskStore for TaskRepository {
    async fn list_all(&self) -> Result<Vec<Task>> {
        let rows = TaskRow::find_by_statement(Statement::from_string(
            self.backend(),
            "SELECT id, text, done FROM tasks ORDER BY id",
        ))
        .all(&self.conn)
        .await
        .context("Failed to list tasks")?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn add(&self, text: &str) -> Result<Option<Task>> {
        if text.trim().is_empty() {
            debug!("Ignoring blank task");
            return Ok(None);
        }

        let result = self
            .conn
            .execute(self.statement(
                "INSERT INTO tasks (text, done) VALUES (?, 0)",
                [text.into()],
            ))
            .await
            .context("Failed to insert task")?;

        let id = i64::try_from(result.last_insert_id()).context("Task id out of range")?;
        info!(task_id = id, "Added task");

        self.find(id).await
    }

    async fn set_done(&self, id: i64, done: bool) -> Result<()> {
        let result = self
            .conn
            .execute(self.statement(
                "UPDATE tasks SET done = ? WHERE id = ?",
                [done.into(), id.into()],
            ))
            .await
            .context("Failed to update task")?;

        debug!(task_id = id, done, rows = result.rows_affected(), "Set task done");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = self
            .conn
            .execute(self.statement("DELETE FROM tasks WHERE id = ?", [id.into()]))
            .await
            .context("Failed to delete task")?;

        debug!(task_id = id, rows = result.rows_affected(), "Deleted task");
        Ok(())
    }

    async fn edit_text(&self, id: i64, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            debug!(task_id = id, "Ignoring blank task edit");
            return Ok(());
        }

        let result = self
            .conn
            .execute(self.statement(
                "UPDATE tasks SET text = ? WHERE id = ?",
                [text.into(), id.into()],
            ))
            .await
            .context("Failed to edit task")?;

        debug!(task_id = id, rows = result.rows_affected(), "Edited task");
        Ok(())
    }
}
