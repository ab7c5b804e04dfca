//! Coding-session transcript discovery and parsing

pub mod context;
pub mod discovery;
