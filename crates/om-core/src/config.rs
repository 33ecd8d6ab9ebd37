use crate::error::OrgmapError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_DB_PATH: &str = ".orgmap/orgmap.db";
pub const DEFAULT_PORT: u16 = 4910;
pub const DEFAULT_PLACEHOLDER_CODE: &str = "Unknown";
pub const DEFAULT_PLACEHOLDER_LONGNAME: &str = "Container for unknown organizations";

/// Service configuration, read from `orgmap.toml`.
///
/// Environment variables `ORGMAP_DB_PATH` and `ORGMAP_PORT` override the
/// file; defaults apply when neither is present.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrgmapConfig {
    pub db_path: String,
    pub port: u16,
    pub placeholder_code: String,
    pub placeholder_longname: String,
}

impl Default for OrgmapConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            port: DEFAULT_PORT,
            placeholder_code: DEFAULT_PLACEHOLDER_CODE.to_string(),
            placeholder_longname: DEFAULT_PLACEHOLDER_LONGNAME.to_string(),
        }
    }
}

impl OrgmapConfig {
    /// Load from the given path (or `orgmap.toml` in the working
    /// directory), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, OrgmapError> {
        let path = path.unwrap_or_else(|| Path::new("orgmap.toml"));
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|err| OrgmapError::Internal {
                    message: format!("invalid config {}: {err}", path.display()),
                })?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                return Err(OrgmapError::Internal {
                    message: format!("cannot read config {}: {err}", path.display()),
                });
            }
        };

        if let Ok(db_path) = std::env::var("ORGMAP_DB_PATH") {
            if !db_path.trim().is_empty() {
                config.db_path = db_path;
            }
        }
        if let Ok(port) = std::env::var("ORGMAP_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: OrgmapConfig = toml::from_str("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.placeholder_code, DEFAULT_PLACEHOLDER_CODE);
    }
}
