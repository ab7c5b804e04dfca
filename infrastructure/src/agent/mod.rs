//! Agent process adapters

pub mod ansi;
pub mod resolver;
pub mod runner;
pub mod synthesizer;
pub(crate) mod transport;
