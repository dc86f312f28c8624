//! Per-session state
//!
//! Each control connection owns one `Session`. Nothing here is shared
//! between connections, so there are no locks; the session mutates its
//! own state only from its own command handling.

use std::collections::HashMap;
use std::net::SocketAddrV4;

use log::debug;
use tokio::net::TcpListener;

use crate::protocol::responses;

/// State owned by a single control connection.
///
/// Created on accept, dropped when the control connection closes. The
/// drop releases any passive listener still held.
pub struct Session {
    /// Name from the last USER command. Never validated.
    user: String,
    /// Directory reported by PWD. Tracked verbatim, never checked
    /// against the filesystem.
    current_dir: String,
    /// Set once TYPE I is acknowledged. Transfers are binary either way.
    binary_mode: bool,
    /// Active-mode target from the last PORT command.
    data_addr: Option<SocketAddrV4>,
    /// Passive-mode listener from the last EPSV command, consumed by the
    /// next transfer.
    passive: Option<TcpListener>,
    /// Value reported by SIZE. Nothing updates it.
    size: u64,
    /// Canned replies for verbs without handler logic.
    responses: HashMap<&'static str, &'static str>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Session {
        Session {
            user: String::new(),
            current_dir: String::from("/"),
            binary_mode: false,
            data_addr: None,
            passive: None,
            size: 0,
            responses: responses::canned_responses(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn set_user(&mut self, user: String) {
        self.user = user;
    }

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = dir;
    }

    pub fn binary_mode(&self) -> bool {
        self.binary_mode
    }

    pub fn set_binary_mode(&mut self, binary: bool) {
        self.binary_mode = binary;
    }

    pub fn data_addr(&self) -> Option<SocketAddrV4> {
        self.data_addr
    }

    pub fn set_data_addr(&mut self, addr: SocketAddrV4) {
        self.data_addr = Some(addr);
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Installs a passive listener, closing any previously opened one
    /// that was never consumed by a transfer.
    pub fn set_passive(&mut self, listener: TcpListener) {
        if let Some(old) = self.passive.take() {
            if let Ok(addr) = old.local_addr() {
                debug!("Closing unused passive listener on {}", addr);
            }
        }
        self.passive = Some(listener);
    }

    /// Takes the passive listener for a transfer, leaving none behind.
    pub fn take_passive(&mut self) -> Option<TcpListener> {
        self.passive.take()
    }

    /// Looks up the canned reply for a verb, if the table knows it.
    pub fn canned_response(&self, verb: &str) -> Option<&'static str> {
        self.responses.get(verb).copied()
    }
}
