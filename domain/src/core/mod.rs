//! Core domain primitives

pub mod error;
pub mod question;
pub mod worker;
