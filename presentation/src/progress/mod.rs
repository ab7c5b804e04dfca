//! Worker progress display

pub mod live;
pub mod reporter;
