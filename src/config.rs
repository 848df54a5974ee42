use std::env;

use tracing::warn;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
/// Live design sessions kept in memory before the oldest is dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// `None` when the key is unset or blank; generation then fails up front.
    pub api_key: Option<String>,
    pub api_base: String,
    pub image_model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub port: u16,
    pub public_url: String,
    pub max_sessions: usize,
}

impl AppConfig {
    /// Reads the process environment. Call after `dotenv::dotenv()`.
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok().filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("GEMINI_API_KEY is not set; concept generation will fail until it is configured.");
        }
        let port = env_u16("PORT", 8080);
        Self {
            gemini: GeminiConfig {
                api_key,
                api_base: env_string("GEMINI_API_BASE", DEFAULT_API_BASE),
                image_model: env_string("GEMINI_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            },
            port,
            public_url: env_string("PUBLIC_URL", &format!("http://localhost:{port}")),
            max_sessions: env_usize("MAX_SESSIONS", DEFAULT_MAX_SESSIONS),
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
