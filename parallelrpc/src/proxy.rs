#[cfg(unix)]
use std::os::unix::io::RawFd;

use dxr::{MethodCall, Value};

use crate::endpoint::Endpoint;
use crate::error::CallError;
use crate::transport::{InFlightToken, TwoStageTransport};

/// A hashable key identifying the wire encoding a call would produce.
///
/// Two proxies with equal `RequestFormat`s produce byte-identical request
/// bodies for equal calls; [`crate::dispatch::TwoStage`] uses this to
/// encode each distinct group's request exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestFormat {
    encoding: Option<String>,
    allow_none: bool,
}

/// The outcome of a two-stage call's write phase.
///
/// An explicit sum type in place of storing a captured exception in the
/// same slot as a token (see spec discussion of "captured errors as
/// sentinel tokens"): callers match on the variant instead of doing runtime
/// type inspection.
pub enum StartOutcome {
    /// The write phase succeeded; the read phase can proceed once the
    /// socket is ready.
    Started(InFlightToken),
    /// The write phase (or the encoding step before it) failed.
    Failed(CallError),
}

/// Per-endpoint proxy that performs XML-RPC calls in two phases: write
/// (`start_request`) and read (`finish_request`).
pub struct TwoStageProxy {
    endpoint: Endpoint,
    transport: TwoStageTransport,
    format: RequestFormat,
    verbose: bool,
}

impl TwoStageProxy {
    /// Construct a two-stage proxy for `endpoint`.
    pub fn new(endpoint: Endpoint, encoding: Option<String>, allow_none: bool, verbose: bool) -> TwoStageProxy {
        TwoStageProxy {
            endpoint,
            transport: TwoStageTransport::new(),
            format: RequestFormat { encoding, allow_none },
            verbose,
        }
    }

    /// The endpoint this proxy targets.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// This proxy's request format key.
    pub fn request_format(&self) -> &RequestFormat {
        &self.format
    }

    /// Pure encoding step: serialize `method(params)` to an XML-RPC request
    /// body. Does not touch the network.
    pub fn make_request(&self, method: &str, params: &[Value]) -> Result<String, CallError> {
        let call = MethodCall::new(method.to_owned(), params.to_vec());
        let body = dxr::serialize_xml(&call).map_err(|e| CallError::Encode(dxr::DxrError::invalid_data(e.to_string())))?;
        Ok(format!("<?xml version=\"1.0\"?>\n{body}\n"))
    }

    /// Start the write phase for an already-encoded request body.
    ///
    /// Never propagates an error to the caller; failures are captured into
    /// the returned [`StartOutcome::Failed`] so one endpoint's failure does
    /// not abort the fan-out.
    pub fn start_request(&self, body: &str) -> StartOutcome {
        match self.transport.start(&self.endpoint.authority(), self.endpoint.path(), body, self.verbose) {
            Ok(token) => StartOutcome::Started(token),
            Err(error) => StartOutcome::Failed(error),
        }
    }

    /// The socket to poll for readiness, or `None` if the write phase
    /// already failed (such an outcome is finished immediately, without
    /// waiting on any socket).
    #[cfg(unix)]
    pub fn socket(&self, outcome: &StartOutcome) -> Option<RawFd> {
        match outcome {
            StartOutcome::Started(token) => self.transport.socket(token).ok(),
            StartOutcome::Failed(_) => None,
        }
    }

    /// Whether the read phase can proceed without blocking.
    ///
    /// Always true for a captured write-phase error, so it surfaces
    /// immediately the next time `finish_request` is called.
    pub fn is_ready(&self, outcome: &StartOutcome) -> bool {
        match outcome {
            StartOutcome::Started(token) => self.transport.is_ready(token),
            StartOutcome::Failed(_) => true,
        }
    }

    /// Complete the read phase, normalizing every failure mode (encode,
    /// connect, write, HTTP, fault, decode) into the error slot. Never
    /// panics or raises.
    pub fn finish_request(&self, outcome: StartOutcome) -> (Option<Value>, Option<CallError>) {
        let token = match outcome {
            StartOutcome::Started(token) => token,
            StartOutcome::Failed(error) => return (None, Some(error)),
        };

        match self.transport.finish(token) {
            Ok(mut values) => {
                if values.len() == 1 {
                    (Some(values.remove(0)), None)
                } else {
                    (Some(Value::array(dxr::Array::from_elements(values))), None)
                }
            }
            Err(error) => (None, Some(error)),
        }
    }

    /// Synchronous convenience: `finish_request(start_request(make_request(...)))`.
    pub fn request(&self, method: &str, params: &[Value]) -> (Option<Value>, Option<CallError>) {
        let body = match self.make_request(method, params) {
            Ok(body) => body,
            Err(error) => return (None, Some(error)),
        };
        self.finish_request(self.start_request(&body))
    }
}

/// What a [`PlainProxy`] actually connects to.
enum PlainTarget {
    /// A plain HTTP endpoint, called in one blocking round trip (no
    /// two-stage split).
    Http(Endpoint, RequestFormat, bool),
    /// A URL whose scheme this engine cannot speak at all (only `http` is
    /// supported; see the non-goals around TLS). Construction succeeds so
    /// the fan-out still produces a result slot for this endpoint, but
    /// every call on it fails.
    Unsupported(String),
}

/// A single-stage, fully blocking fallback proxy.
///
/// Used for endpoints that are not two-stage-eligible: non-`http` schemes,
/// and (under [`crate::dispatch::Hybrid`]'s default host-gating policy)
/// non-loopback `http` endpoints.
pub struct PlainProxy {
    target: PlainTarget,
    verbose: bool,
}

impl PlainProxy {
    /// Construct a plain proxy for an `http` endpoint.
    pub fn http(endpoint: Endpoint, encoding: Option<String>, allow_none: bool, verbose: bool) -> PlainProxy {
        PlainProxy {
            target: PlainTarget::Http(endpoint, RequestFormat { encoding, allow_none }, verbose),
            verbose,
        }
    }

    /// Construct a plain proxy for a URL whose scheme is not supported.
    pub fn unsupported(url: String) -> PlainProxy {
        PlainProxy {
            target: PlainTarget::Unsupported(url),
            verbose: false,
        }
    }

    /// Perform one blocking round trip.
    pub fn request(&self, method: &str, params: &[Value]) -> (Option<Value>, Option<CallError>) {
        match &self.target {
            PlainTarget::Http(endpoint, format, _) => {
                let proxy = TwoStageProxy::new(endpoint.clone(), format.encoding.clone(), format.allow_none, self.verbose);
                proxy.request(method, params)
            }
            PlainTarget::Unsupported(url) => (None, Some(CallError::Http(format!("unsupported protocol: {url}")))),
        }
    }
}

/// Either kind of per-endpoint proxy a [`crate::facade::ParallelProxy`] may hold.
pub enum ProxyHandle {
    /// A two-stage-capable proxy.
    TwoStage(TwoStageProxy),
    /// A single-stage fallback proxy.
    Plain(PlainProxy),
}

impl ProxyHandle {
    /// Run one call against this proxy, blocking until it completes.
    pub fn request(&self, method: &str, params: &[Value]) -> (Option<Value>, Option<CallError>) {
        match self {
            ProxyHandle::TwoStage(proxy) => proxy.request(method, params),
            ProxyHandle::Plain(proxy) => proxy.request(method, params),
        }
    }

    /// Borrow the two-stage proxy, if this handle is one.
    pub fn as_two_stage(&self) -> Option<&TwoStageProxy> {
        match self {
            ProxyHandle::TwoStage(proxy) => Some(proxy),
            ProxyHandle::Plain(_) => None,
        }
    }
}
