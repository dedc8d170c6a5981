//! Command modules for the module creator CLI.
//!
//! - `create_cmd`: input resolution and module repository creation

pub mod create_cmd;
