//! FTP responses
//!
//! The literal response lines the server writes on the control channel.
//! Client compatibility depends on the exact text, down to the trailing
//! periods (present on the STOR completion line, absent on RETR's).

use std::collections::HashMap;
use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Greeting sent when a session starts; also the fallback reply for
/// unrecognized verbs.
pub const READY: &str = "220 Ftp Server Ready";
pub const GOODBYE: &str = "221 Goodbye.";
pub const PORT_OK: &str = "200 Port command successful";
pub const DIRECTORY_CHANGED: &str = "250 Directory successfully changed.";
pub const BINARY_MODE: &str = "200 Switching to Binary mode.";
pub const PASSWORD_REQUIRED: &str = "331 Password required for User.";
pub const LOGGED_IN: &str = "230 User logged in";
pub const OPENING_DATA_CONNECTION: &str = "150 Opening data connection";
pub const OK_TO_SEND: &str = "150 Ok to send data.";
/// Completion line for STOR, trailing period included.
pub const STOR_COMPLETE: &str = "226 Transfer complete.";
/// Completion line for RETR, no trailing period.
pub const RETR_COMPLETE: &str = "226 Transfer complete";
pub const SYNTAX_ERROR: &str = "501 Syntax error in parameters or arguments";
pub const CANT_OPEN_DATA_CONNECTION: &str = "425 Can't open data connection";
pub const TRANSFER_ABORTED: &str = "426 Connection closed; transfer aborted";
pub const CANT_CREATE_FILE: &str = "550 Cannot create file";

/// Builds the canned verb-to-response table: fixed replies for verbs
/// that carry no handler logic.
///
/// One copy per session, constructed at session start and never mutated.
pub fn canned_responses() -> HashMap<&'static str, &'static str> {
    HashMap::from([("PASS", LOGGED_IN)])
}

pub fn current_directory(dir: &str) -> String {
    format!("257 \"{}\" is the current directory", dir)
}

pub fn size_of(size: u64) -> String {
    format!("213 {}", size)
}

/// EPSV reply advertising the passive port.
pub fn passive_mode(port: u16) -> String {
    format!("229 Entering Extended Passive Mode (|||{}|)", port)
}

/// Writes one response line, CRLF-terminated, to the control connection.
pub async fn send_line<W>(writer: &mut W, line: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pwd_reply_quotes_the_directory() {
        assert_eq!(
            current_directory("/"),
            "257 \"/\" is the current directory"
        );
    }

    #[test]
    fn epsv_reply_wraps_the_port_in_bars() {
        assert_eq!(
            passive_mode(2121),
            "229 Entering Extended Passive Mode (|||2121|)"
        );
    }

    #[test]
    fn size_reply_carries_the_value() {
        assert_eq!(size_of(0), "213 0");
    }
}
