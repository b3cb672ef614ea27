//! SQLite connection setup on top of SeaORM.

use anyhow::{anyhow, Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::config::DatabaseConfig;

pub const MEMORY_DSN: &str = "sqlite::memory:";

/// Supported storage backend, detected from the DSN scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
}

pub fn detect_backend(dsn: &str) -> Result<Backend> {
    let raw = dsn.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    if is_memory(raw) {
        return Ok(Backend::Sqlite);
    }
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

fn is_memory(dsn: &str) -> bool {
    dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
///
/// - Keeps in-memory DSNs as `sqlite::memory:`.
/// - Normalizes backslashes into forward slashes.
/// - Adds `mode=rwc` unless a mode is given, so the file is created on first start.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_memory(dsn) {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite3://"))
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }

    let mut params: Vec<&str> = query
        .map(|q| q.split('&').filter(|kv| !kv.is_empty()).collect())
        .unwrap_or_default();
    if !params.iter().any(|kv| kv.starts_with("mode=")) {
        params.push("mode=rwc");
    }

    Ok(format!(
        "sqlite://{}?{}",
        p.to_string_lossy().replace('\\', "/"),
        params.join("&")
    ))
}

/// Open the pool described by `cfg`. With `mock` set an in-memory database is used.
pub async fn connect(
    cfg: &DatabaseConfig,
    base_dir: &Path,
    mock: bool,
) -> Result<DatabaseConnection> {
    let dsn = if mock {
        MEMORY_DSN.to_string()
    } else {
        detect_backend(&cfg.url)?;
        absolutize_sqlite_dsn(cfg.url.trim(), base_dir, true)?
    };

    let busy_timeout = Duration::from_millis(u64::from(cfg.busy_timeout_ms.unwrap_or(5000)));
    // Every pooled connection to `:memory:` would get its own empty database.
    let max_conns = if is_memory(&dsn) {
        1
    } else {
        cfg.max_conns.unwrap_or(10)
    };
    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false)
        .map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy_timeout));

    tracing::info!(dsn = %dsn, "Connecting to database");
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {dsn}"))?;
    tracing::info!("Database connection established");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_dsn_is_kept() {
        let base = Path::new("/unused");
        assert_eq!(
            absolutize_sqlite_dsn("sqlite::memory:", base, false).unwrap(),
            MEMORY_DSN
        );
        assert_eq!(
            absolutize_sqlite_dsn("sqlite://:memory:", base, false).unwrap(),
            MEMORY_DSN
        );
    }

    #[test]
    fn relative_path_resolves_under_base_and_creates_dirs() {
        let tmp = tempdir().unwrap();
        let dsn = absolutize_sqlite_dsn("sqlite://data/contacts.db", tmp.path(), true).unwrap();

        let expected = tmp
            .path()
            .join("data/contacts.db")
            .to_string_lossy()
            .replace('\\', "/");
        assert_eq!(dsn, format!("sqlite://{expected}?mode=rwc"));
        assert!(tmp.path().join("data").exists());
    }

    #[test]
    fn existing_query_is_preserved() {
        let tmp = tempdir().unwrap();
        let dsn =
            absolutize_sqlite_dsn("sqlite://c.db?mode=ro&cache=shared", tmp.path(), false).unwrap();
        assert!(dsn.ends_with("?mode=ro&cache=shared"));

        let dsn = absolutize_sqlite_dsn("sqlite://c.db?cache=shared", tmp.path(), false).unwrap();
        assert!(dsn.ends_with("?cache=shared&mode=rwc"));
    }

    #[test]
    fn sqlite3_scheme_is_normalised() {
        let tmp = tempdir().unwrap();
        assert_eq!(detect_backend("sqlite3://c.db").unwrap(), Backend::Sqlite);

        let dsn = absolutize_sqlite_dsn("sqlite3://c.db", tmp.path(), false).unwrap();
        assert!(dsn.starts_with("sqlite://"), "{dsn}");
        assert!(dsn.ends_with("c.db?mode=rwc"), "{dsn}");
    }

    #[test]
    fn bad_dsns_are_rejected() {
        let base = Path::new("/tmp");
        assert!(absolutize_sqlite_dsn("postgres://x", base, false).is_err());
        assert!(absolutize_sqlite_dsn("sqlite://", base, false).is_err());
        assert!(detect_backend("").is_err());
        assert!(detect_backend("mysql://localhost/db").is_err());
        assert_eq!(detect_backend("sqlite://x.db").unwrap(), Backend::Sqlite);
    }

    #[tokio::test]
    async fn connect_mock_uses_memory() {
        let cfg = DatabaseConfig {
            url: "postgres://ignored".into(),
            max_conns: Some(1),
            busy_timeout_ms: None,
        };
        let db = connect(&cfg, Path::new("/nonexistent"), true).await.unwrap();
        assert!(db.ping().await.is_ok());
    }
}
