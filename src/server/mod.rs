//! HTTP server and trust gating

pub mod http;
pub mod trust;

pub use http::{build_metadata, router, run, Caller, ServerState};
pub use trust::{client_origin, Cidr, TrustedNetworks};
