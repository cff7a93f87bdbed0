#![allow(dead_code)]

pub mod abis;
pub mod entity_trait;
pub mod l1sap;
pub mod messagerouter;
pub mod nm;
pub mod phy;

// Re-export commonly used items from router
pub use entity_trait::BtsEntityTrait;
pub use messagerouter::{MessagePrio, MessageQueue, MessageRouter};
