// src/config.rs
//
// Static configuration: the monitored server list, channel ids, RCON target,
// and loop timings come from a JSON file; secrets (bot token, RCON password)
// come from the environment so they stay out of the config file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub host: String,
    #[serde(default = "default_game_port")]
    pub port: u16,
    pub icon_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RconConfig {
    pub host: String,
    #[serde(default = "default_rcon_port")]
    pub port: u16,
    /// Overridden by `RCON_PASSWORD` when that is set.
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub channel_id: u64,
    pub log_file: PathBuf,
    /// Name of the monitored server the log belongs to; its status gates
    /// tailing so an offline server is not hammered every poll.
    pub server: String,
    pub rcon: RconConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub servers: Vec<ServerConfig>,
    pub status_channel_id: u64,
    pub relay: RelayConfig,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_tail_interval_secs")]
    pub tail_interval_secs: u64,
    #[serde(default = "default_offline_backoff_secs")]
    pub offline_backoff_secs: u64,
    #[serde(default = "default_history_scan_limit")]
    pub history_scan_limit: u16,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&raw)?;
        if config.servers.is_empty() {
            return Err(Error::Config("no monitored servers configured".into()));
        }
        Ok(config)
    }

    pub fn discord_token() -> Result<String, Error> {
        std::env::var("DISCORD_TOKEN")
            .map_err(|_| Error::Config("DISCORD_TOKEN is not set".into()))
    }

    pub fn rcon_password(&self) -> String {
        std::env::var("RCON_PASSWORD").unwrap_or_else(|_| self.relay.rcon.password.clone())
    }
}

fn default_game_port() -> u16 {
    25565
}

fn default_rcon_port() -> u16 {
    25575
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_tail_interval_secs() -> u64 {
    2
}

fn default_offline_backoff_secs() -> u64 {
    30
}

fn default_history_scan_limit() -> u16 {
    20
}

fn default_query_timeout_secs() -> u64 {
    5
}
