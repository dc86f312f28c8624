//! Error-to-response translation

use crate::error::TransferError;
use crate::protocol::responses;

/// Maps a transfer failure to the line sent on the control channel.
///
/// Every mapping here leaves the session running; only control-channel
/// I/O failures end it.
pub fn transfer_failure_response(err: &TransferError) -> &'static str {
    match err {
        TransferError::NoDataChannel | TransferError::Connect(_) | TransferError::Accept(_) => {
            responses::CANT_OPEN_DATA_CONNECTION
        }
        TransferError::CreateFile(_, _) => responses::CANT_CREATE_FILE,
        TransferError::Stream(_) => responses::TRANSFER_ABORTED,
    }
}
