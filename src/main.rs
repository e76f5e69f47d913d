//! Main entry point for the Castle Ranker service
//!
//! Loads configuration, opens the roster store, serves the HTTP API and
//! monitoring endpoints, and shuts down gracefully on SIGINT/SIGTERM.

use anyhow::Result;
use castle_ranker::api;
use castle_ranker::config::AppConfig;
use castle_ranker::metrics::{HealthServer, HealthServerConfig};
use castle_ranker::service::{AppState, HealthCheck, HealthStatus};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info, warn};

/// Castle Ranker - Elo rankings for character-vs-character fan votes
#[derive(Parser)]
#[command(
    name = "castle-ranker",
    version,
    about = "A character-vs-character Elo ranking service",
    long_about = "Castle Ranker records pairwise fan votes between characters, updates an overall \
                 Elo rating plus the category ratings stressed by the fight scenario, and serves \
                 leaderboards, tier lists and faction summaries over HTTP."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Perform health check and exit
    #[arg(long, help = "Perform a health check and exit with status code")]
    health_check: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override HTTP server port")]
    http_port: Option<u16>,

    /// Data file override
    #[arg(long, value_name = "FILE", help = "Override the roster data file")]
    data_path: Option<PathBuf>,

    /// Skip seeding the bundled roster
    #[arg(long, help = "Do not seed the bundled roster into an empty store")]
    no_seed: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Perform health check and return appropriate exit code
async fn perform_health_check(config: AppConfig) -> Result<()> {
    info!("Performing health check...");

    let app_state = Arc::new(AppState::new(config).await?);
    app_state.start().await?;

    let health = HealthCheck::check(app_state.clone()).await;
    app_state.shutdown().await?;

    match health {
        Ok(health) => {
            println!("Health Check: {}", health.status);
            println!("  Characters: {}", health.stats.characters);
            println!("  Storage fallbacks: {}", health.stats.storage_fallbacks);
            for check in &health.checks {
                println!("  {}: {}", check.name, check.status);
            }

            if health.status == HealthStatus::Healthy {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Run periodic health checks
async fn health_check_task(app_state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(30));

    while app_state.is_running().await {
        interval.tick().await;

        match HealthCheck::check(app_state.clone()).await {
            Ok(health) => {
                info!(
                    "Health check: {} - {} characters, {} votes recorded",
                    health.status, health.stats.characters, health.stats.votes_recorded
                );
            }
            Err(e) => {
                warn!("Health check failed: {}", e);
            }
        }
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🏰 Castle Ranker");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   HTTP: {}", config.http_address());
    info!("   Storage: {}", config.storage.backend);
    info!("   Data file: {}", config.storage.data_path.display());
    info!("   K-factor: {}", config.rating.k_factor);
    info!("   Match history limit: {}", config.rating.history_limit);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    if let Some(data_path) = &args.data_path {
        config.storage.data_path = data_path.clone();
    }

    if args.no_seed {
        config.storage.seed_default_roster = false;
    }

    castle_ranker::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Some(config_path) = &args.config {
        info!("Loaded configuration from: {}", config_path.display());
    }

    if args.health_check {
        return perform_health_check(config).await;
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let app_state = match AppState::new(config.clone()).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting service...");
    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    let server = Arc::new(
        HealthServer::new(
            HealthServerConfig {
                host: config.service.http_host.clone(),
                port: config.service.http_port,
            },
            app_state.metrics_collector(),
        )
        .with_app_state(app_state.clone())
        .with_routes(api::create_router(app_state.clone())),
    );

    let server_task = {
        let server = server.clone();
        tokio::spawn(async move {
            if let Err(e) = server.start().await {
                error!("HTTP server failed: {:#}", e);
            }
        })
    };

    let health_task = {
        let app_state = app_state.clone();
        tokio::spawn(async move {
            health_check_task(app_state).await;
        })
    };

    info!("✅ Castle Ranker is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    wait_for_shutdown_signal().await;

    info!("🛑 Shutdown signal received, beginning graceful shutdown...");

    health_task.abort();

    let shutdown_timeout = config.shutdown_timeout();
    let shutdown = async {
        server.stop().await?;
        if let Err(e) = server_task.await {
            warn!("HTTP server task ended abnormally: {}", e);
        }
        app_state.shutdown().await?;
        Ok::<(), anyhow::Error>(())
    };

    match tokio::time::timeout(shutdown_timeout, shutdown).await {
        Ok(Ok(())) => {
            info!("✅ Graceful shutdown completed successfully");
        }
        Ok(Err(e)) => {
            error!("Shutdown failed: {:#}", e);
        }
        Err(_) => {
            warn!("⚠️  Shutdown timeout exceeded, forcing exit");
        }
    }

    info!("🛑 Castle Ranker stopped");
    Ok(())
}
