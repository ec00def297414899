//! Generator configuration file.
//!
//! Looked up as `daokit.toml` in the working directory, then as
//! `<config dir>/daokit/config.toml`. Every key is optional; command-line
//! flags and environment variables take precedence.
//!
//! ```toml
//! [codegen]
//! schema = "public"
//! prefix = "Base"
//! crate_path = "daokit"
//! out_dir = "src/dao"
//! updated_col = "updated_at"
//!
//! [postgres]
//! url = "postgres://localhost/app"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DaoError, DaoResult};

/// Name of the project-local config file.
pub const FILE_NAME: &str = "daokit.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub codegen: CodegenConfig,
    pub postgres: PostgresConfig,
}

/// Defaults for `daokit gen`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    pub schema: Option<String>,
    pub prefix: Option<String>,
    pub crate_path: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub updated_col: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub url: Option<String>,
}

impl Config {
    /// Parse a config document.
    pub fn from_toml(content: &str) -> DaoResult<Self> {
        toml::from_str(content).map_err(|e| DaoError::Config(e.to_string()))
    }

    /// Read and parse a config file.
    pub fn load_from(path: &Path) -> DaoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| match e {
            DaoError::Config(msg) => DaoError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// First existing config file, project-local before user-wide.
    pub fn locate() -> Option<PathBuf> {
        let local = PathBuf::from(FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("daokit").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Load the located config file, or defaults when there is none.
    pub fn load() -> DaoResult<Self> {
        match Self::locate() {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::load_from(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [codegen]
            schema = "app"
            prefix = "Gen"
            out_dir = "src/dao"

            [postgres]
            url = "postgres://localhost/app"
            "#,
        )
        .unwrap();

        assert_eq!(config.codegen.schema.as_deref(), Some("app"));
        assert_eq!(config.codegen.prefix.as_deref(), Some("Gen"));
        assert_eq!(config.codegen.out_dir, Some(PathBuf::from("src/dao")));
        assert_eq!(config.codegen.crate_path, None);
        assert_eq!(config.postgres.url.as_deref(), Some("postgres://localhost/app"));
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_bad_config() {
        let err = Config::from_toml("[codegen]\nschema = 3").unwrap_err();
        assert!(matches!(err, DaoError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("daokit-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(FILE_NAME);
        std::fs::write(&path, "[codegen]\nprefix = \"Dao\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.codegen.prefix.as_deref(), Some("Dao"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
