//! moca-capture
//!
//! Per-kind answer capture: the adapters a flow mounts for each question,
//! the freehand drawing surface, and the microphone capability seam.

pub mod adapters;
pub mod device;
pub mod drawing;
pub mod error;
