use std::io;

use dxr::{DxrError, Fault};
use thiserror::Error;

/// Everything that can go wrong while resolving a single endpoint's result.
///
/// A `CallError` never aborts a fan-out: it is captured into that endpoint's
/// `(None, Some(error))` result slot and reported back alongside the
/// successes (see [`crate::facade::CallResult`]).
#[derive(Debug, Error)]
pub enum CallError {
    /// Serializing the method call failed (e.g. an unmarshallable argument).
    #[error("failed to encode request: {0}")]
    Encode(#[from] DxrError),

    /// TCP connect, or DNS resolution, failed.
    #[error("failed to connect to {host}: {source}")]
    Connect {
        /// The host that could not be reached.
        host: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The socket broke while writing the request.
    #[error("failed to write request: {0}")]
    Write(#[source] io::Error),

    /// The socket broke, or the response was malformed HTTP, while reading
    /// the response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server's HTTP status was not 200.
    #[error("unexpected HTTP status {status}")]
    Status {
        /// The HTTP status code that was returned.
        status: u16,
    },

    /// The server returned a well-formed XML-RPC fault.
    #[error(transparent)]
    Fault(#[from] Fault),

    /// The response body was not a valid XML-RPC response or fault.
    #[error("failed to decode response: {0}")]
    Decode(#[source] DxrError),

    /// `finish`/`socket` was called with a token from a previous `start`
    /// call on the same transport.
    #[error("stale in-flight token (transport has moved on to a later call)")]
    StaleToken,
}

/// Errors raised at construction time rather than captured per-call.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// The endpoint's URL used an unsupported scheme.
    #[error("unsupported protocol for endpoint '{0}': only http:// is supported")]
    UnknownProtocol(String),

    /// The endpoint's URL could not be parsed at all.
    #[error("malformed endpoint URL '{0}'")]
    MalformedUrl(String),
}
