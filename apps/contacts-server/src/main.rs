use anyhow::{Context, Result};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm_migration::MigratorTrait;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;

use api_ingress::{ApiIngress, ApiIngressConfig};
use contacts::api::rest::{openapi::ContactsApiDoc, routes::register_routes};
use contacts::infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmContactsRepository};
use contacts::{Service, ServiceConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Contacts Server - CRUD HTTP service for a contact list
#[derive(Parser)]
#[command(name = "contacts-server")]
#[command(about = "Contacts Server - CRUD HTTP service for a contact list")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Contacts Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

fn database_config(config: &AppConfig) -> DatabaseConfig {
    config.database.clone().unwrap_or_else(|| {
        tracing::warn!("No database configuration found, using sqlite://contacts.db");
        DatabaseConfig {
            url: "sqlite://contacts.db".to_string(),
            max_conns: None,
            busy_timeout_ms: None,
        }
    })
}

fn ingress_config(config: &AppConfig) -> Result<ApiIngressConfig> {
    let mut ingress: ApiIngressConfig = config.module_config("api_ingress")?;
    if config.server.timeout_sec > 0 {
        ingress.request_timeout_secs = config.server.timeout_sec;
    }
    Ok(ingress)
}

fn bind_addr(config: &AppConfig) -> Result<SocketAddr> {
    let raw = format!("{}:{}", config.server.host, config.server.port);
    raw.parse()
        .with_context(|| format!("Invalid bind address '{raw}'"))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let base_dir = PathBuf::from(&config.server.home_dir);
    let addr = bind_addr(&config)?;

    let db_config = database_config(&config);
    let db = runtime::db::connect(&db_config, &base_dir, args.mock).await?;
    Migrator::up(&db, None)
        .await
        .context("Failed to run contacts migrations")?;
    tracing::info!("Database schema is up to date");

    let service_config: ContactsModuleConfig = config.module_config("contacts")?;
    let repo = Arc::new(SeaOrmContactsRepository::new(db));
    let service = Arc::new(Service::new(repo, service_config.into()));

    let ingress = ApiIngress::new(ingress_config(&config)?);
    let router = ingress.build_router(
        register_routes(Router::new(), service),
        Some(ContactsApiDoc::openapi()),
    )?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "Signal handler failed, shutting down"),
        }
        signal_cancel.cancel();
    });

    ingress.serve(addr, router, cancel).await?;
    tracing::info!("Contacts Server stopped");
    Ok(())
}

/// `modules.contacts` section of the config.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ContactsModuleConfig {
    max_name_length: Option<usize>,
}

impl From<ContactsModuleConfig> for ServiceConfig {
    fn from(cfg: ContactsModuleConfig) -> Self {
        let mut out = ServiceConfig::default();
        if let Some(max) = cfg.max_name_length {
            out.max_name_length = max;
        }
        out
    }
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    bind_addr(&config)?;
    ingress_config(&config)?;
    let _: ContactsModuleConfig = config.module_config("contacts")?;
    if !args.mock {
        runtime::db::detect_backend(&database_config(&config).url)?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}
