//! CLI, configuration, agenda rendering
//!
//! This crate provides the `dashcal` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
