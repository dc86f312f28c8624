//! FTP control protocol
//!
//! Command parsing, response text, and the per-verb handlers.

pub mod commands;
pub mod handlers;
pub mod responses;
pub mod translators;

pub use commands::{parse_command, Command};
pub use handlers::{handle_command, SessionFlow};
