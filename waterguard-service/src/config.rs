use serde::Deserialize;
use std::{fs, path::Path};

pub const CONFIG_ENV: &str = "WATERGUARD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "waterguard-config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Reads `$WATERGUARD_CONFIG`, else `waterguard-config.toml` when present,
    /// else built-in defaults.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            Err(_) => {
                tracing::info!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = AppConfig::from_toml_str("").expect("parse");
        assert_eq!(cfg.http.bind_addr, "127.0.0.1:8501");
        assert_eq!(cfg.http.max_upload_bytes, 10 * 1024 * 1024);
        assert!(cfg.metrics.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [http]
            bind_addr = "0.0.0.0:9000"
            max_upload_bytes = 1024

            [metrics]
            bind_addr = "0.0.0.0:9100"
            "#,
        )
        .expect("parse");

        assert_eq!(cfg.http.bind_addr, "0.0.0.0:9000");
        assert_eq!(cfg.http.max_upload_bytes, 1024);
        assert_eq!(cfg.metrics.map(|m| m.bind_addr).as_deref(), Some("0.0.0.0:9100"));
    }

    #[test]
    fn partial_http_section_keeps_other_defaults() {
        let cfg = AppConfig::from_toml_str("[http]\nmax_upload_bytes = 5\n").expect("parse");
        assert_eq!(cfg.http.bind_addr, "127.0.0.1:8501");
        assert_eq!(cfg.http.max_upload_bytes, 5);
    }

    #[test]
    fn missing_named_file_is_an_error() {
        assert!(AppConfig::from_file("/nonexistent/waterguard.toml").is_err());
    }
}
