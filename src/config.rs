use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Panel configuration, loaded once at startup and passed into each component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub device: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: String,
    pub labeled_commands: HashMap<String, String>,
    pub startup_commands: Vec<String>,
    pub tv_broadcast_ip: String,
    pub tv_macaddress: String,
    pub server_port: u16,
    pub meeting_room_email: String,
}

impl Config {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: String::new(),
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: "none".to_string(),
            labeled_commands: HashMap::new(),
            startup_commands: vec![],
            tv_broadcast_ip: String::new(),
            tv_macaddress: String::new(),
            server_port: 8080,
            meeting_room_email: String::new(),
        }
    }
}
