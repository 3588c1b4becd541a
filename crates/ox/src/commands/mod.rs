//! Command implementations for ox CLI.
//!
//! Each submodule implements the logic for one command.

pub mod config;
pub mod list;
pub mod render;
pub mod signature;
