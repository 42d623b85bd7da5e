//! moca-flow
//!
//! The administration state machine. A [`controller::FlowController`] walks
//! an instrument's catalog one question at a time, mounts the matching
//! capture adapter, manages the microphone and countdown for the question,
//! and submits the answer package once the last question is answered.

pub mod config;
pub mod controller;
pub mod countdown;
pub mod error;
pub mod view;
