use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_server_config")]
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub tunnel: Option<TunnelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the BadgerChat API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base URL used to build "READ MORE" postback links.
    #[serde(default = "default_postback_base_url")]
    pub postback_base_url: String,
    /// Badger ID sent as the X-CS571-ID header on every upstream request.
    pub bid: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TunnelConfig {
    /// File holding the ngrok auth token on a single line.
    pub token_file: PathBuf,
}

impl TunnelConfig {
    /// Reads and trims the tunnel auth token. The tunnel itself is run by
    /// an external ngrok process; we only verify the secret is available.
    pub fn read_token(&self) -> Result<String> {
        let token = std::fs::read_to_string(&self.token_file)
            .with_context(|| format!("Failed to read token file: {}", self.token_file.display()))?;
        let token = token.trim().to_string();
        if token.is_empty() {
            anyhow::bail!("Token file is empty: {}", self.token_file.display());
        }
        Ok(token)
    }
}

fn default_server_config() -> ServerConfig {
    ServerConfig {
        port: default_port(),
    }
}

fn default_port() -> u16 {
    53705
}

fn default_base_url() -> String {
    "https://cs571.org/s23/hw12".to_string()
}

fn default_postback_base_url() -> String {
    "https://cs571.org/s23/badgerchat".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }
}
