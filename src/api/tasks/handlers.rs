use axum::{
    Form,
    extract::{Path, State},
    response::{Html, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::TasksState;
use crate::api::{AppError, found, views};

#[derive(Deserialize)]
pub struct TaskForm {
    /// Missing or blank text makes the request a no-op.
    #[serde(default)]
    pub task: String,
}

/// GET /
pub async fn index(State(state): State<Arc<TasksState>>) -> Result<Html<String>, AppError> {
    let tasks = state.tasks.list_all().await?;
    Ok(Html(views::tasks::index(&tasks)))
}

/// POST /add
pub async fn add_task(
    State(state): State<Arc<TasksState>>,
    Form(form): Form<TaskForm>,
) -> Result<Response, AppError> {
    state.tasks.add(&form.task).await?;
    Ok(found("/"))
}

/// GET /complete/{id}
pub async fn complete_task(
    State(state): State<Arc<TasksState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.tasks.set_done(id, true).await?;
    Ok(found("/"))
}

/// GET /delete/{id}
pub async fn delete_task(
    State(state): State<Arc<TasksState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.tasks.delete(id).await?;
    Ok(found("/"))
}

/// POST /edit/{id}
pub async fn edit_task(
    State(state): State<Arc<TasksState>>,
    Path(id): Path<i64>,
    Form(form): Form<TaskForm>,
) -> Result<Response, AppError> {
    state.tasks.edit_text(id, &form.task).await?;
    Ok(found("/"))
}
