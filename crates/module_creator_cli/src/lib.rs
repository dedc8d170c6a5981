//! Module creator CLI library exports for integration testing.
//!
//! This module exposes the command implementation, the configuration file, the workflow
//! command logger and the output writer.

pub mod action_logger;
pub mod commands;
pub mod config;
pub mod errors;
pub mod outputs;
