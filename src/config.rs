use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_UPLOAD_DELAY_MS: u64 = 5000;
pub const DEFAULT_MAX_WEEKLY_HOURS: u32 = 18;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Minimum spacing between two record writes of a bulk import.
    pub upload_delay: Duration,
    /// Load ceiling for faculty without a personal override.
    pub max_weekly_hours: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://uniadmin.db?mode=rwc".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upload_delay: Duration::from_millis(DEFAULT_UPLOAD_DELAY_MS),
            max_weekly_hours: DEFAULT_MAX_WEEKLY_HOURS,
        }
    }
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => parse_var("BIND_ADDR", &raw)?,
            Err(_) => defaults.bind_addr,
        };

        let upload_delay = match env::var("UPLOAD_DELAY_MS") {
            Ok(raw) => Duration::from_millis(parse_var("UPLOAD_DELAY_MS", &raw)?),
            Err(_) => defaults.upload_delay,
        };

        let max_weekly_hours = match env::var("MAX_WEEKLY_HOURS") {
            Ok(raw) => parse_var("MAX_WEEKLY_HOURS", &raw)?,
            Err(_) => defaults.max_weekly_hours,
        };

        Ok(Self {
            database_url,
            bind_addr,
            upload_delay,
            max_weekly_hours,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} is invalid: {}", name, raw)))
}
