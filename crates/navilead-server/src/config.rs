//! Server configuration management

use std::path::PathBuf;

use navilead::Currency;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Base directory for stored offer templates
    pub template_dir: PathBuf,

    /// Directory for rolling log files
    pub log_dir: PathBuf,

    /// VAT applied when a request does not carry its own
    pub default_vat_percent: f64,

    /// Currency for billing endpoints
    pub default_currency: Currency,

    /// CORS allowed origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Request body limit in bytes
    pub max_body_bytes: usize,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let default_vat_percent: f64 = var_or("DEFAULT_VAT_PERCENT", "25")
            .parse()
            .map_err(|_| ApiError::Config("Invalid DEFAULT_VAT_PERCENT value".to_string()))?;
        if !(0.0..=100.0).contains(&default_vat_percent) {
            return Err(ApiError::Config(
                "DEFAULT_VAT_PERCENT must be between 0 and 100".to_string(),
            ));
        }

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: var_or("PORT", "3000")
                .parse()
                .map_err(|_| ApiError::Config("Invalid PORT value".to_string()))?,
            template_dir: PathBuf::from(var_or("TEMPLATE_DIR", "./data")),
            log_dir: PathBuf::from(var_or("LOG_DIR", "./logs")),
            default_vat_percent,
            default_currency: var_or("DEFAULT_CURRENCY", "DKK")
                .parse()
                .map_err(|_| ApiError::Config("Invalid DEFAULT_CURRENCY value".to_string()))?,
            cors_origins: var_or("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            max_body_bytes: var_or("MAX_BODY_BYTES", "2097152")
                .parse()
                .map_err(|_| ApiError::Config("Invalid MAX_BODY_BYTES value".to_string()))?,
        })
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            template_dir: PathBuf::from("./data"),
            log_dir: PathBuf::from("./logs"),
            default_vat_percent: navilead::quote::DEFAULT_VAT_PERCENT,
            default_currency: Currency::Dkk,
            cors_origins: vec!["*".to_string()],
            max_body_bytes: 2 * 1024 * 1024, // 2MB, templates are plain HTML
        }
    }
}
