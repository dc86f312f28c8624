//! Data connections and transfer loops

pub mod data_channel;
pub mod store;

pub use data_channel::DataChannel;
pub use store::{prepare_destination, receive_file, BUFFER_SIZE};
