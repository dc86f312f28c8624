//! Error types
//!
//! Defines domain-specific error types for command parsing and data
//! transfers.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors produced while parsing a command line from the client.
///
/// Every variant maps to the same `501` syntax-error response; the
/// session keeps reading commands afterwards.
#[derive(Debug)]
pub enum CommandError {
    EmptyLine,
    MissingArgument(&'static str),
    BadPortTuple(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::EmptyLine => write!(f, "empty command line"),
            CommandError::MissingArgument(verb) => {
                write!(f, "missing argument for {}", verb)
            }
            CommandError::BadPortTuple(arg) => {
                write!(f, "invalid PORT tuple: {}", arg)
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Errors produced while establishing or driving a data transfer.
///
/// These abort the transfer in progress but never the session: the
/// dispatcher maps each variant to a response line and continues the
/// command loop.
#[derive(Debug)]
pub enum TransferError {
    /// Neither PORT nor EPSV was issued before the transfer command.
    NoDataChannel,
    /// Dialing the client's advertised data address failed.
    Connect(io::Error),
    /// Accepting a connection on the passive listener failed.
    Accept(io::Error),
    /// Creating the destination file or its parent directories failed.
    CreateFile(PathBuf, io::Error),
    /// I/O error while streaming bytes mid-transfer.
    Stream(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::NoDataChannel => {
                write!(f, "no data channel: use PORT or EPSV first")
            }
            TransferError::Connect(e) => {
                write!(f, "failed to connect to client data port: {}", e)
            }
            TransferError::Accept(e) => {
                write!(f, "failed to accept on passive listener: {}", e)
            }
            TransferError::CreateFile(path, e) => {
                write!(f, "failed to create {}: {}", path.display(), e)
            }
            TransferError::Stream(e) => write!(f, "transfer I/O error: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}
