//! Use cases

pub mod run_judge;
