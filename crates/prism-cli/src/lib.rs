//! Prism CLI: commands, configuration and image I/O behind the `prism` binary.

pub mod commands;
pub mod config;
pub mod image_io;

pub use config::CliConfig;
