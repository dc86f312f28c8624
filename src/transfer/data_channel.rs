//! Data channel establishment
//!
//! A data channel is a plain TCP connection opened per transfer, either
//! outbound to the address the client announced with PORT (active mode)
//! or inbound on the listener opened for EPSV (passive mode). Dropping
//! the channel closes the connection, which is how transfer end is
//! signalled to the peer.

use std::net::SocketAddrV4;

use log::debug;
use tokio::net::{TcpListener, TcpStream};

use crate::error::TransferError;

/// A connected data channel, closed on drop.
pub struct DataChannel {
    stream: TcpStream,
    // Holds the passive listener for the duration of the transfer so the
    // port stays claimed until the channel closes.
    _listener: Option<TcpListener>,
}

impl DataChannel {
    /// Active mode: dial the address the client announced with PORT.
    pub async fn connect(addr: SocketAddrV4) -> Result<DataChannel, TransferError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransferError::Connect)?;
        debug!("Data channel connected to {}", addr);
        Ok(DataChannel {
            stream,
            _listener: None,
        })
    }

    /// Passive mode: accept the single connection the client dials in.
    pub async fn accept(listener: TcpListener) -> Result<DataChannel, TransferError> {
        let (stream, peer) = listener.accept().await.map_err(TransferError::Accept)?;
        debug!("Data channel accepted from {}", peer);
        Ok(DataChannel {
            stream,
            _listener: Some(listener),
        })
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }
}
