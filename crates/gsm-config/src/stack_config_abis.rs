use std::collections::HashMap;

use serde::Deserialize;
use toml::Value;

/// Abis link configuration
#[derive(Debug, Clone)]
pub struct CfgAbis {
    /// BSC hosts, tried in order. Each host is tried once.
    pub oml_hosts: Vec<String>,
    /// OML TCP port on the BSC
    pub port: u16,
    /// Delay before retrying a link that dropped while still establishing
    pub reconnect_delay_secs: u64,
    /// TCP connect timeout
    pub connect_timeout_secs: u64,
}

impl CfgAbis {
    pub fn new(oml_hosts: Vec<String>) -> Self {
        Self {
            oml_hosts,
            port: default_abis_port(),
            reconnect_delay_secs: default_abis_reconnect_delay(),
            connect_timeout_secs: default_abis_connect_timeout(),
        }
    }
}

#[derive(Default, Deserialize)]
pub struct CfgAbisDto {
    pub oml_hosts: Vec<String>,
    #[serde(default = "default_abis_port")]
    pub port: u16,
    #[serde(default = "default_abis_reconnect_delay")]
    pub reconnect_delay_secs: u64,
    #[serde(default = "default_abis_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn default_abis_port() -> u16 {
    3002
}

fn default_abis_reconnect_delay() -> u64 {
    1
}

fn default_abis_connect_timeout() -> u64 {
    10
}

/// Convert a CfgAbisDto (from TOML) into a CfgAbis (used in the stack config)
pub fn apply_abis_patch(src: CfgAbisDto) -> CfgAbis {
    CfgAbis {
        oml_hosts: src.oml_hosts.into_iter().map(|h| h.trim().to_string()).collect(),
        port: src.port,
        reconnect_delay_secs: src.reconnect_delay_secs,
        connect_timeout_secs: src.connect_timeout_secs,
    }
}
