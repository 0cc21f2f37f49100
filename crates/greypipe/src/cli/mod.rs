//! Command handlers for the greypipe binary.

pub mod config;
pub mod process;
