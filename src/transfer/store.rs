//! Upload receive loop

use std::path::Path;

use log::debug;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::TransferError;
use crate::transfer::DataChannel;

/// Chunk size for the receive loop.
pub const BUFFER_SIZE: usize = 8192;

/// Creates the intermediate directories for `dest`.
///
/// Runs before the server tells the client to start sending, so a
/// failure here surfaces as a create error rather than an aborted
/// transfer.
pub async fn prepare_destination(dest: &Path) -> Result<(), TransferError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| TransferError::CreateFile(dest.to_path_buf(), e))?;
    }
    Ok(())
}

/// Receives one file from the data channel into `dest`.
///
/// A mid-transfer error leaves the partial file in place.
pub async fn receive_file(channel: &mut DataChannel, dest: &Path) -> Result<u64, TransferError> {
    let mut file = fs::File::create(dest)
        .await
        .map_err(|e| TransferError::CreateFile(dest.to_path_buf(), e))?;

    let mut buffer = [0u8; BUFFER_SIZE];
    let mut received: u64 = 0;
    loop {
        let n = channel
            .stream_mut()
            .read(&mut buffer)
            .await
            .map_err(TransferError::Stream)?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])
            .await
            .map_err(TransferError::Stream)?;
        received += n as u64;
    }
    file.flush().await.map_err(TransferError::Stream)?;

    debug!("Received {} bytes into {}", received, dest.display());
    Ok(received)
}
