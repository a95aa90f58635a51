use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveTime;
use chrono_tz::Tz;
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    /// Zone used for day bucketing and the auto-close cutoff
    pub timezone: Tz,
    pub auto_close_at: NaiveTime,

    // Rate limiting
    pub rate_login_per_min: u32,

    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: String,

    /// Creates an `Admin` manager on first start when set
    pub bootstrap_manager_pin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", "2592000")?, // default 30 days

            timezone: env::var("TIMEZONE")
                .unwrap_or_else(|_| "Asia/Kolkata".to_string())
                .parse::<Tz>()
                .map_err(|e| anyhow!("TIMEZONE is not a valid IANA zone: {e}"))?,
            auto_close_at: NaiveTime::parse_from_str(
                &env::var("AUTO_CLOSE_AT").unwrap_or_else(|_| "20:00".to_string()),
                "%H:%M",
            )
            .context("AUTO_CLOSE_AT must be HH:MM")?,

            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", "30")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),

            bootstrap_manager_pin: env::var("BOOTSTRAP_MANAGER_PIN")
                .ok()
                .filter(|p| !p.is_empty()),
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("{key} is not a valid value"))
}
