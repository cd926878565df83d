use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub event_buffer_size: usize,
    /// Shared dispatcher secret checked by the stub credential verifier.
    pub admin_password: String,
    pub store_name: String,
    pub store_address: String,
    pub audit_api_url: Option<String>,
    pub audit_api_key: Option<String>,
    pub ai_api_url: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "123".to_string()),
            store_name: env::var("STORE_NAME").unwrap_or_else(|_| "Loja Central".to_string()),
            store_address: env::var("STORE_ADDRESS")
                .unwrap_or_else(|_| "Av. Paulista, 1000 - São Paulo".to_string()),
            audit_api_url: optional_var("AUDIT_API_URL"),
            audit_api_key: optional_var("AUDIT_API_KEY"),
            ai_api_url: optional_var("AI_API_URL"),
            ai_api_key: optional_var("AI_API_KEY"),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            seed_demo_data: parse_or_default("SEED_DEMO_DATA", false)?,
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
