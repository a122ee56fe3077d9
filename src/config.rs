use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS (empty means any origin)
    pub cors_allow_origins: Vec<String>,

    // Model gateway
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub groq_model: String,
    pub model_timeout_seconds: u64,
    pub model_retry_max_elapsed_seconds: u64,

    // Geocoding
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_region: String,
    pub geocode_stagger_ms: u64,
    pub geocode_timeout_seconds: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "*")
            .collect();

        // Model gateway
        let groq_api_key = env::var("GROQ_API_KEY").context("GROQ_API_KEY must be set")?;
        let groq_base_url = env::var("GROQ_BASE_URL")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
        let groq_model =
            env::var("GROQ_MODEL").unwrap_or_else(|_| "llama-3.1-8b-instant".to_string());
        let model_timeout_seconds = parse_or("MODEL_TIMEOUT_SECONDS", 60);
        let model_retry_max_elapsed_seconds = parse_or("MODEL_RETRY_MAX_ELAPSED_SECONDS", 20);

        // Geocoding
        let geocoder_url = env::var("GEOCODER_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
        let geocoder_user_agent = env::var("GEOCODER_USER_AGENT")
            .unwrap_or_else(|_| "MaharashtraTourGuide/1.0".to_string());
        let geocoder_region =
            env::var("GEOCODER_REGION").unwrap_or_else(|_| "Maharashtra, India".to_string());
        let geocode_stagger_ms = parse_or("GEOCODE_STAGGER_MS", 600);
        let geocode_timeout_seconds = parse_or("GEOCODE_TIMEOUT_SECONDS", 10);

        Ok(Settings {
            env,
            server_addr,
            cors_allow_origins,
            groq_api_key,
            groq_base_url,
            groq_model,
            model_timeout_seconds,
            model_retry_max_elapsed_seconds,
            geocoder_url,
            geocoder_user_agent,
            geocoder_region,
            geocode_stagger_ms,
            geocode_timeout_seconds,
        })
    }

    pub fn geocode_stagger(&self) -> Duration {
        Duration::from_millis(self.geocode_stagger_ms)
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode_timeout_seconds)
    }
}

fn parse_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_names_are_lenient() {
        assert_eq!(Environment::from_str("Production"), Environment::Prod);
        assert_eq!(Environment::from_str("staging"), Environment::Staging);
        assert_eq!(Environment::from_str("anything"), Environment::Dev);
    }
}
