//! Persistence boundary for the to-do list.

use anyhow::Result;

use crate::models::task::Task;

/// Storage for [`Task`] rows. Operations on an id that does not exist change
/// nothing and succeed.
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks in insertion order.
    async fn list_all(&self) -> Result<Vec<Task>>;

    /// Adds a not-yet-done task. Blank text is ignored and yields `None`.
    async fn add(&self, text: &str) -> Result<Option<Task>>;

    async fn set_done(&self, id: i64, done: bool) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// Replaces the text of a task. Blank text is ignored.
    async fn edit_text(&self, id: i64, text: &str) -> Result<()>;
}
