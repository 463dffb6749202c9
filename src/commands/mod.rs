//! CLI commands

pub mod restore;
pub mod utils;
