use crate::error::{Error, Result};
use crate::utils::avatar::{AvatarStyle, DEFAULT_AVATAR_TEMPLATE};
use std::env;

pub const DEFAULT_WHOP_API_BASE_URL: &str = "https://api.whop.com/api/v1";
pub const DEFAULT_WHOP_TOKEN_ISSUER: &str = "urn:whopcom:exp-proxy";
pub const DEFAULT_ROSTER_PAGE_SIZE: u32 = 100;
pub const MAX_ROSTER_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub whop_api_key: String,
    pub whop_api_base_url: String,
    pub whop_app_id: Option<String>,
    pub whop_company_id: Option<String>,
    pub whop_token_public_key: Option<String>,
    pub whop_token_issuer: String,
    pub avatar_url_template: String,
    pub avatar_style: AvatarStyle,
    pub roster_page_size: u32,
    pub sign_in_path: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:3000"),
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            whop_api_key: get_env("WHOP_API_KEY")?,
            whop_api_base_url: get_env_or("WHOP_API_BASE_URL", DEFAULT_WHOP_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            whop_app_id: get_env_opt("WHOP_APP_ID"),
            whop_company_id: get_env_opt("WHOP_COMPANY_ID"),
            whop_token_public_key: get_env_opt("WHOP_TOKEN_PUBLIC_KEY")
                .map(|pem| pem.replace("\\n", "\n")),
            whop_token_issuer: get_env_or("WHOP_TOKEN_ISSUER", DEFAULT_WHOP_TOKEN_ISSUER),
            avatar_url_template: get_env_or("AVATAR_URL_TEMPLATE", DEFAULT_AVATAR_TEMPLATE),
            avatar_style: get_env_parse_or("AVATAR_STYLE", AvatarStyle::default())?,
            roster_page_size: check_range(
                "ROSTER_PAGE_SIZE",
                get_env_parse_or("ROSTER_PAGE_SIZE", DEFAULT_ROSTER_PAGE_SIZE)?,
                1..=MAX_ROSTER_PAGE_SIZE,
            )?,
            sign_in_path: get_env_or("SIGN_IN_PATH", "/"),
            log_format: get_env_parse_or("LOG_FORMAT", LogFormat::default())?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn check_range<T>(name: &str, value: T, range: std::ops::RangeInclusive<T>) -> Result<T>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(Error::Config(format!(
            "Invalid value for {}: {} is outside {}..={}",
            name,
            value,
            range.start(),
            range.end()
        )))
    }
}
