//! CLI library components for the medical record manager.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
