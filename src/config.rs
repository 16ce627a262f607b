use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub cors_allowed_origin: Option<String>,
    pub seed_demo_data: bool,
    pub seed_default_password: String,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 20)?,
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            seed_demo_data: get_env_parse_or("SEED_DEMO_DATA", false)?,
            seed_default_password: env::var("SEED_DEFAULT_PASSWORD")
                .unwrap_or_else(|_| "changeme123".to_string()),
            log_format: parse_log_format(env::var("LOG_FORMAT").ok().as_deref())?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("pretty") => Ok(LogFormat::Pretty),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(Error::Config(format!("Invalid value for LOG_FORMAT: {}", other))),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_defaults_to_pretty() {
        assert_eq!(parse_log_format(None).unwrap(), LogFormat::Pretty);
        assert_eq!(parse_log_format(Some("JSON")).unwrap(), LogFormat::Json);
        assert!(parse_log_format(Some("xml")).is_err());
    }
}
