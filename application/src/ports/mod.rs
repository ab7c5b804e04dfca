//! Ports (interfaces) implemented by outer layers

pub mod agent_runner;
pub mod progress;
pub mod status;
pub mod synthesizer;
