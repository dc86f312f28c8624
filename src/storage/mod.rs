//! Upload storage
//!
//! Decides where uploaded files land on the local filesystem.

pub mod layout;

pub use layout::StorageLayout;
