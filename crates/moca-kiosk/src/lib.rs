//! moca-kiosk library root.
//!
//! Re-exports internal modules so that integration tests can exercise the
//! config layer, the microphone source and the terminal session directly.

pub mod config;
pub mod microphone;
pub mod terminal;
