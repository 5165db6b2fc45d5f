use config::{Config, Environment, File};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads configuration from a given config file or environment variables.
pub fn load_config(config_file_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    // Load .env file if it exists, ignore if not present
    dotenv().ok();

    let mut settings = Config::builder();

    if let Some(path) = config_file_path {
        settings = settings.add_source(File::from(path).required(true));
    }

    // Add environment variables with prefix WITHDRAWAL
    settings = settings.add_source(Environment::with_prefix("WITHDRAWAL").separator("__"));

    let app_config = settings.build()?.try_deserialize::<AppConfig>()?;

    Ok(app_config)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

impl DatabaseConfig {
    pub fn get_db_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| panic!("DATABASE_URL is not set in environment or .env file"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base, overridable so tests can point at a local mock server.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

impl TelegramConfig {
    pub fn get_bot_token(&self) -> String {
        std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_else(|_| {
            panic!("TELEGRAM_BOT_TOKEN is not set in environment or .env file")
        })
    }

    pub fn get_admin_chat_id(&self) -> i64 {
        std::env::var("TELEGRAM_ADMIN_CHAT_ID")
            .unwrap_or_else(|_| {
                panic!("TELEGRAM_ADMIN_CHAT_ID is not set in environment or .env file")
            })
            .parse()
            .unwrap_or_else(|_| panic!("TELEGRAM_ADMIN_CHAT_ID must be a valid chat id"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdminConfig {}

impl AdminConfig {
    pub fn get_api_key(&self) -> AdminKey {
        AdminKey::new(
            std::env::var("ADMIN_API_KEY")
                .unwrap_or_else(|_| panic!("ADMIN_API_KEY is not set in environment or .env file")),
        )
    }
}

/// Shared secret for the admin panel listing endpoint.
#[derive(Clone)]
pub struct AdminKey(String);

impl AdminKey {
    pub fn new(key: String) -> Self {
        Self(key)
    }

    /// Digest equality keeps the comparison time independent of how much of
    /// the presented key matches.
    pub fn matches(&self, presented: &str) -> bool {
        Sha256::digest(self.0.as_bytes()) == Sha256::digest(presented.as_bytes())
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_key_matches_exact_value_only() {
        let key = AdminKey::new("s3cret".to_string());
        assert!(key.matches("s3cret"));
        assert!(!key.matches("s3cret "));
        assert!(!key.matches("s3cre"));
        assert!(!key.matches(""));
    }

    #[test]
    fn defaults_cover_all_sections() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.telegram.api_base, "https://api.telegram.org");
        assert_eq!(cfg.telegram.request_timeout_ms, 5000);
    }
}
