//! `filtersnap_endpoint` v1:
//! JSON GET/POST passthrough to the filter-data endpoint.
//!
//! Failures are logged and swallowed by the default entry points; the
//! `try_*` variants keep the error for callers that need it.
pub mod client;
pub mod conf;

pub use client::{EndpointClient, EndpointError};
pub use conf::{C_ENDPOINT_URL_DEFAULT, C_ENV_ENDPOINT_URL};
