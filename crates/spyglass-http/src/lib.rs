//! Spyglass HTTP
//!
//! The transport contract the Spyglass instrumentation layer wraps:
//!
//! - [`RequestDescriptor`]: a serializable description of an outbound call
//!   (method, URL, headers, body), detached from any client library's
//!   request object so captured calls can be replayed later
//! - [`TransportResponse`]: the minimal response surface (status, headers,
//!   body) with a success indicator
//! - [`TransportError`]: the failure vocabulary; cancellation and injected
//!   faults are distinct variants, never string-matched
//! - [`HttpTransport`]: the async call site trait; interceptors implement
//!   it too, so wrapped and unwrapped transports are interchangeable
//!
//! With the `reqwest` feature, [`ReqwestTransport`] provides a production
//! transport backed by a [`reqwest::Client`].

pub mod error;
pub mod request;
pub mod response;
#[cfg(feature = "reqwest")]
pub mod reqwest_transport;
pub mod transport;

pub use error::TransportError;
pub use request::{RequestBody, RequestDescriptor};
pub use response::TransportResponse;
#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
pub use transport::HttpTransport;
