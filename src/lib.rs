pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;

use anyhow::Context;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;

/// Loads the config named on the command line, or searches the default locations.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match (&cli.command, &cli.config) {
        (Commands::InitConfig, _) => Config::default(),
        (_, Some(path)) => Config::load_from_path(path)?,
        (_, None) => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}

pub fn init_logging(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn install_metrics(config: &Config) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    init_logging(&config);

    match cli.command {
        Commands::InitConfig => {
            let path = cli.config.unwrap_or_else(Config::default_config_path);
            if Config::create_default_if_missing(&path)? {
                println!("Wrote default config to {}", path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
            Ok(())
        }
        Commands::Accounts => {
            let metrics = install_metrics(&config)?;
            let state = api::accounts::create_state_from_config(&config, metrics).await?;
            let addr = format!("{}:{}", config.accounts.bind_address, config.accounts.port);
            serve("accounts", &addr, api::accounts::router(state)).await
        }
        Commands::Tasks => {
            let metrics = install_metrics(&config)?;
            let state = api::tasks::create_state_from_config(&config, metrics).await?;
            let addr = format!("{}:{}", config.tasks.bind_address, config.tasks.port);
            serve("tasks", &addr, api::tasks::router(state)).await
        }
    }
}

async fn serve(service: &str, addr: &str, app: Router) -> anyhow::Result<()> {
    info!(
        "Tandem v{} starting {} service...",
        env!("CARGO_PKG_VERSION"),
        service
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🌐 {} service running at http://{}", service, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("{} service stopped", service);
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
