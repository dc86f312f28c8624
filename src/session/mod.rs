//! Per-connection session handling

pub mod handler;
pub mod state;

pub use handler::handle_session;
pub use state::Session;
