//! The to-do list: add, complete, edit and delete tasks.

use axum::{
    Router,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::Config;
use crate::db::{self, TaskRepository};
use crate::services::TaskStore;

mod handlers;

pub struct TasksState {
    pub tasks: Arc<dyn TaskStore>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_state_from_config(
    config: &Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<TasksState>> {
    let conn = db::connect(
        &config.tasks.database_path,
        config.tasks.max_db_connections,
        config.tasks.min_db_connections,
    )
    .await?;

    let repo = TaskRepository::new(conn);
    repo.ensure_schema().await?;

    Ok(Arc::new(TasksState {
        tasks: Arc::new(repo),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<TasksState>) -> Router {
    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/add", post(handlers::add_task))
        .route("/complete/{id}", get(handlers::complete_task))
        .route("/delete/{id}", get(handlers::delete_task))
        .route("/edit/{id}", post(handlers::edit_task))
        .merge(crate::api::observability::metrics_routes(
            state.prometheus_handle.clone(),
        ))
        .fallback(crate::api::not_found)
        .with_state(state);

    crate::api::with_common_layers(app)
}
