//! BTS configuration management
//!
//! This crate provides configuration loading and parsing for the BTS:
//! - TOML configuration file parsing
//! - Stack configuration structures and shared runtime state
//! - Abis link and power/timing control parameters

pub mod stack_config;
pub mod stack_config_abis;
pub mod stack_config_power;
pub mod toml_config;

pub use stack_config::*;
pub use stack_config_abis::CfgAbis;
pub use stack_config_power::*;
pub use toml_config::*;
