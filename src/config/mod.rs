//! Configuration module for the portal list backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::models::{SortDirection, SortSpec};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Page size used when a list request does not carry one
    pub default_page_size: u32,
    /// Fixed page size used for the single retry after a failed fetch
    pub retry_page_size: u32,
    /// Sort column used when a list request does not carry one
    pub default_sort_column: String,
    /// Sort direction used when a list request does not carry one
    pub default_sort_direction: SortDirection,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("PORTAL_DB_PATH")
            .unwrap_or_else(|_| "./data/portal.sqlite".to_string())
            .into();

        let bind_addr = env::var("PORTAL_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Validation(format!("Invalid PORTAL_BIND_ADDR: {}", e)))?;

        let log_level = env::var("PORTAL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let default_page_size = parse_page_size("PORTAL_DEFAULT_PAGE_SIZE", 25)?;
        let retry_page_size = parse_page_size("PORTAL_RETRY_PAGE_SIZE", 500)?;

        let default_sort_column =
            env::var("PORTAL_DEFAULT_SORT_COLUMN").unwrap_or_else(|_| "modified_at".to_string());

        let default_sort_direction = match env::var("PORTAL_DEFAULT_SORT_DIRECTION") {
            Ok(raw) => SortDirection::parse_strict(&raw).ok_or_else(|| {
                AppError::Validation(format!(
                    "Invalid PORTAL_DEFAULT_SORT_DIRECTION '{}': expected asc or desc",
                    raw
                ))
            })?,
            Err(_) => SortDirection::Desc,
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            default_page_size,
            retry_page_size,
            default_sort_column,
            default_sort_direction,
        })
    }

    /// The sort applied when a request expresses no preference.
    pub fn default_sort(&self) -> SortSpec {
        SortSpec::new(&self.default_sort_column, self.default_sort_direction)
    }
}

fn parse_page_size(var: &str, default: u32) -> Result<u32, AppError> {
    match env::var(var) {
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(size) if size > 0 => Ok(size),
            _ => Err(AppError::Validation(format!(
                "Invalid {} '{}': expected a positive integer",
                var, raw
            ))),
        },
        Err(_) => Ok(default),
    }
}
