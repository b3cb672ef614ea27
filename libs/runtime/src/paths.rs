use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Expand a leading `~` into the user's home directory.
pub fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"));
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Resolve the server home directory into an absolute path.
///
/// `None` falls back to `$HOME/<default_subdir>`. Relative paths are taken
/// relative to the current working directory. With `create` set, the
/// directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let mut path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => dirs::home_dir()
            .ok_or_else(|| anyhow!("Cannot determine home directory"))?
            .join(default_subdir),
    };

    if path.is_relative() {
        path = std::env::current_dir()
            .context("Cannot read current directory")?
            .join(path);
    }

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create home_dir {}", path.display()))?;
    }

    Ok(normalize(&path))
}

// Lexical cleanup of `.` components; `..` is kept as-is.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_dir_is_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");

        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true).unwrap();

        assert!(resolved.is_absolute());
        assert!(resolved.exists());
        assert!(resolved.ends_with("nested/home"));
    }

    #[test]
    fn tilde_is_expanded() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~").unwrap(), home);
            assert_eq!(expand_tilde("~/abc").unwrap(), home.join("abc"));
        }
        assert_eq!(expand_tilde("/tmp/x").unwrap(), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn dot_components_are_dropped() {
        let tmp = tempdir().unwrap();
        let raw = format!("{}/./data", tmp.path().to_string_lossy());
        let resolved = resolve_home_dir(Some(raw), ".x", false).unwrap();
        assert_eq!(resolved, tmp.path().join("data"));
    }
}
