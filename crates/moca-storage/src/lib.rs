//! moca-storage
//!
//! Clients for the remote Assessment Store and Media Store. The traits are
//! what the flow depends on; [`client::HttpStore`] implements both over HTTP.

pub mod assessments;
pub mod client;
pub mod error;
pub mod media;
