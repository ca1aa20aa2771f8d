//! HTTP module
//!
//! The `Transport` seam a collection fetches through, plus a reqwest
//! implementation with base URL joining, default headers and status
//! classification.

mod client;

pub use client::{HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder, Transport};
