//! TCP front end: the accept loop and the per-connection event loop.

pub mod connection;
pub mod gateway;
