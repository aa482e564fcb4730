use std::fs;

use url::Url;

const DEFAULT_BLINK_BASE_URL: &str = "https://blinktochat.fun";
const DEFAULT_DIAL_CLUSTER: &str = "devnet";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },
    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
    #[error("no bot token in ENV_TELEGRAM_BOT_TOKEN, and could not read key file {path}: {source}")]
    NoToken {
        path: &'static str,
        source: std::io::Error,
    },
}

/// Everything the bot needs to know at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub mongo_uri: String,
    pub mongo_db_name: String,
    /// Serve a webhook at this URL instead of long polling.
    pub webhook_url: Option<Url>,
    pub port: u16,
    pub blink_base_url: Url,
    /// Cluster segment of dial.to links, like `devnet`.
    pub dial_cluster: String,
    /// DAS JSON-RPC endpoint to classify gating targets with.
    pub indexer_url: Option<Url>,
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { var, source })
}

impl Config {
    /// Read the configuration from the process environment. The bot token
    /// falls back to the `key` file (`key_debug` in debug builds).
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration using `lookup` to get variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        // Blank counts as unset.
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let bot_token = match get("ENV_TELEGRAM_BOT_TOKEN") {
            Some(token) => token,
            None => {
                let path = match cfg!(debug_assertions) {
                    true => "key_debug",
                    false => "key",
                };
                fs::read_to_string(path)
                    .map_err(|source| ConfigError::NoToken { path, source })?
            }
        };

        let port = match get("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))?,
            None => DEFAULT_PORT,
        };

        let webhook_url = get("ENV_WEBHOOK_URL")
            .map(|url| parse_url("ENV_WEBHOOK_URL", &url))
            .transpose()?;

        let indexer_url = get("ENV_INDEXER_URL")
            .map(|url| parse_url("ENV_INDEXER_URL", &url))
            .transpose()?;

        let blink_base_url = parse_url(
            "ENV_BLINK_BASE_URL",
            &get("ENV_BLINK_BASE_URL").unwrap_or_else(|| DEFAULT_BLINK_BASE_URL.to_string()),
        )?;

        Ok(Config {
            bot_token: bot_token.trim().to_string(),
            mongo_uri: require("ENV_MONGO_URI")?,
            mongo_db_name: require("ENV_MONGO_DB_NAME")?,
            webhook_url,
            port,
            blink_base_url,
            dial_cluster: get("ENV_DIAL_CLUSTER")
                .unwrap_or_else(|| DEFAULT_DIAL_CLUSTER.to_string()),
            indexer_url,
        })
    }
}
