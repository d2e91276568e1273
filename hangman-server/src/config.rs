use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub game_timeout_minutes: u64,
    pub connection_timeout_seconds: u64,
    pub enforce_unique_names: bool,
    pub word_list_path: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            game_timeout_minutes: env::var("GAME_TIMEOUT_MINUTES")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("Invalid GAME_TIMEOUT_MINUTES"),
            connection_timeout_seconds: env::var("CONNECTION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("Invalid CONNECTION_TIMEOUT_SECONDS"),
            enforce_unique_names: env::var("ENFORCE_UNIQUE_NAMES")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .expect("Invalid ENFORCE_UNIQUE_NAMES"),
            word_list_path: env::var("WORD_LIST_PATH").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
