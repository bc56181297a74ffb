use std::{sync::OnceLock, time::Duration};

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_keep_alive_interval_secs")]
    pub keep_alive_interval_secs: u64,
    #[serde(default)]
    pub log_json: bool,
}

fn default_api_url() -> String {
    "http://127.0.0.1:4000".into()
}

fn default_keep_alive_interval_secs() -> u64 {
    60
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>()
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_interval_secs.max(1))
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| Config::from_env().unwrap_or_else(|e| panic!("invalid configuration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = envy::from_iter::<_, Config>(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:4000");
        assert_eq!(config.keep_alive_interval(), Duration::from_secs(60));
        assert!(!config.log_json);
    }

    #[test]
    fn reads_values() {
        let config = envy::from_iter::<_, Config>(vec![
            ("API_URL".to_string(), "https://notes.example.com".to_string()),
            ("KEEP_ALIVE_INTERVAL_SECS".to_string(), "0".to_string()),
            ("LOG_JSON".to_string(), "true".to_string()),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://notes.example.com");
        assert_eq!(config.keep_alive_interval(), Duration::from_secs(1));
        assert!(config.log_json);
    }
}
