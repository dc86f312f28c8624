//! dropftp
//!
//! A minimal FTP server for unattended file drops. Sessions speak a
//! small slice of the command set (PORT, EPSV, STOR and friends), with
//! uploads landing under a configurable directory layout. Each control
//! connection runs on its own task and shares nothing with the others.

pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod storage;
pub mod transfer;

pub use server::{Server, ServerConfig};
