#![allow(dead_code)]

pub mod component_test;
pub mod scripted_transport;
pub mod sink;

pub use component_test::{ComponentTest, default_test_config};
pub use scripted_transport::ScriptedTransport;
pub use sink::Sink;
