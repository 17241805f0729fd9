//! Configuration module for the emoji catalog backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the page admin routes
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Seed the catalog and page stubs on startup
    pub seed_on_startup: bool,
    /// Generate content for every stub on startup
    pub backfill_on_startup: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("EMOJI_API_PSK").ok().filter(|k| !k.is_empty());

        let db_path = env::var("EMOJI_DB_PATH")
            .unwrap_or_else(|_| "./data/emojis.sqlite".to_string())
            .into();

        let bind_addr = env::var("EMOJI_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid EMOJI_BIND_ADDR format");

        let log_level = env::var("EMOJI_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let seed_on_startup = env_flag("EMOJI_SEED", true);
        let backfill_on_startup = env_flag("EMOJI_BACKFILL_ON_STARTUP", false);

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            seed_on_startup,
            backfill_on_startup,
        }
    }
}

/// Read a boolean flag, accepting `1/0`, `true/false`, `yes/no`, `on/off`.
fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => parse_flag(&value).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
