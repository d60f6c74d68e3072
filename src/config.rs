use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database: PathBuf,
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings. All four variables must be present for email to be
/// enabled; otherwise notifications are dropped with a warning at startup.
pub struct SmtpConfig {
    pub relay: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("HOSTELDESK_PORT", "3000"),
            database: PathBuf::from(try_load::<String>("HOSTELDESK_DB", "hosteldesk.db")),
            smtp: SmtpConfig::load(),
        }
    }
}

impl SmtpConfig {
    fn load() -> Option<Self> {
        let config = Self {
            relay: env::var("SMTP_RELAY").ok()?,
            username: env::var("SMTP_USERNAME").ok()?,
            password: env::var("SMTP_PASSWORD").ok()?,
            from: env::var("SMTP_FROM").ok()?,
        };
        info!("SMTP relay configured: {}", config.relay);
        Some(config)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
