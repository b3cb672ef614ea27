//! Shared process runtime for the contacts server: layered configuration,
//! logging setup, home directory handling and the database connection.

pub mod config;
pub mod db;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
