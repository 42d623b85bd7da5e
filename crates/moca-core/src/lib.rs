//! moca-core
//!
//! Pure domain types for the MoCA administration flow: questions, answers,
//! scores, store records, and the remote API path conventions.
//! No I/O. This is the shared vocabulary of the moca crates.

use std::future::Future;
use std::pin::Pin;

pub mod api_paths;
pub mod error;
pub mod models;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
