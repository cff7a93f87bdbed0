#![allow(dead_code)]

/// Custom definitions for stack control
pub mod control;

pub mod mph;
pub mod oml;
pub mod ph;
pub mod rsl;
pub mod sapmsg;

pub use sapmsg::*;
