//! Wire-level plumbing for the security API

pub mod client;
pub mod endpoints;
pub mod envelope;

pub use client::{HttpTransport, Transport};
pub use endpoints::Endpoints;
pub use envelope::{Envelope, REVOKED_CODE};
