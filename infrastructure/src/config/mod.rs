//! Configuration loading

pub mod file_config;
pub mod loader;
