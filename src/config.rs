use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

pub const DEFAULT_STORAGE_FILE: &str = "yad2_data.json";

const MARKETPLACE_DOMAIN: &str = "yad2.co.il";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub car_listing_url: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    #[serde(default = "default_storage_file")]
    pub storage_file: String,
    #[serde(default)]
    pub chrome_path: Option<String>,
}

fn default_storage_file() -> String {
    DEFAULT_STORAGE_FILE.to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Environment::default())
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Chrome binary override for containerized environments
        if config.chrome_path.is_none() {
            config.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.car_listing_url.trim().is_empty() {
            return Err(ConfigError::Message("CAR_LISTING_URL must not be empty".into()));
        }

        if Url::parse(&self.car_listing_url).is_err() {
            return Err(ConfigError::Message("Invalid listing URL format".into()));
        }

        if self.telegram_bot_token.trim().is_empty() {
            return Err(ConfigError::Message("TELEGRAM_BOT_TOKEN must not be empty".into()));
        }

        if self.telegram_chat_id.trim().is_empty() {
            return Err(ConfigError::Message("TELEGRAM_CHAT_ID must not be empty".into()));
        }

        if self.storage_file.trim().is_empty() {
            return Err(ConfigError::Message("STORAGE_FILE must not be empty".into()));
        }

        Ok(())
    }

    pub fn is_marketplace_url(&self) -> bool {
        self.car_listing_url.contains(MARKETPLACE_DOMAIN)
    }
}
