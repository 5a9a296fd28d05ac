use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::task::TaskRepository;
pub use repositories::user::UserRepository;

/// Opens a pooled connection to a SQLite database, creating the file and its
/// parent directory first when they do not exist yet.
pub async fn connect(
    db_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection> {
    let in_memory = db_url.contains(":memory:");

    if !in_memory {
        let path_str = db_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        let path_str = path_str.split('?').next().unwrap_or(path_str);
        if let Some(parent) = Path::new(path_str).parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        if !Path::new(path_str).exists() {
            std::fs::File::create(path_str)
                .with_context(|| format!("Failed to create database file {path_str}"))?;
        }
    }

    // Each pooled connection to `:memory:` would otherwise open its own empty database.
    let (max_connections, min_connections) = if in_memory {
        (1, 1)
    } else {
        (max_connections, min_connections)
    };

    let mut opt = ConnectOptions::new(db_url.to_string());
    opt.max_connections(max_connections)
        .min_connections(min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    if !in_memory {
        opt.idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600));
    }

    let conn = Database::connect(opt)
        .await
        .with_context(|| format!("Failed to connect to {db_url}"))?;

    ping(&conn)
        .await
        .with_context(|| format!("Database at {db_url} did not answer"))?;

    info!(
        "Database connected: {} (pool: {}-{})",
        db_url, min_connections, max_connections
    );

    Ok(conn)
}

/// Connects and brings the `users` schema up to date.
pub async fn connect_accounts(
    db_url: &str,
    max_connections: u32,
    min_connections: u32,
) -> Result<DatabaseConnection> {
    use sea_orm_migration::MigratorTrait;

    let conn = connect(db_url, max_connections, min_connections).await?;
    migrator::Migrator::up(&conn, None)
        .await
        .context("Failed to apply account migrations")?;
    info!("Account migrations applied");

    Ok(conn)
}

/// Round-trips a trivial query; run once on every new pool.
pub async fn ping(conn: &DatabaseConnection) -> Result<()> {
    let backend = conn.get_database_backend();
    conn.query_one(Statement::from_string(backend, "SELECT 1".to_string()))
        .await?;
    Ok(())
}
