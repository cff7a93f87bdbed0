//! Core utilities for the GSM BTS stack
//!
//! This crate provides fundamental types and utilities used across the stack:
//! - GsmTime for TDMA frame numbering
//! - NM object state, object identities and NACK causes
//! - Physical/logical channel descriptions
//! - Band tables and RXLEV conversions
//! - Common macros and debug utilities

pub mod band;
pub mod chan;
pub mod debug;
pub mod gsm_common;
pub mod gsm_entities;
pub mod gsm_time;
pub mod nm_state;
pub mod pdu_parse_error;

// Re-export commonly used items
pub use band::GsmBand;
pub use chan::*;
pub use gsm_common::*;
pub use gsm_entities::BtsEntity;
pub use gsm_time::GsmTime;
pub use nm_state::*;
pub use pdu_parse_error::PduParseErr;

/// Number of timeslots per TDMA frame
pub const NUM_TS: usize = 8;
