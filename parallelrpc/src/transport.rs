use std::io::{Read, Write};
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::Mutex;

use dxr::{Fault, FaultResponse, MethodResponse, Value};
use log::{debug, trace, warn};

use crate::error::CallError;

const USER_AGENT: &str = concat!("parallelrpc/", env!("CARGO_PKG_VERSION"));

/// An in-flight two-stage call: the write phase has completed, the read
/// phase has not.
///
/// Bound to the [`TwoStageTransport`] that created it; it is a contract
/// violation to pass a token to a different transport, or to reuse one
/// after the owning transport has moved on to a later call (see `seq`).
pub struct InFlightToken {
    stream: TcpStream,
    #[allow(dead_code)]
    verbose: bool,
    seq: u64,
}

/// Splits one XML-RPC-over-HTTP round trip into a write phase (`start`) and
/// a read phase (`finish`), so many transports can be driven concurrently by
/// a single caller polling their sockets for readiness.
///
/// One `TwoStageTransport` is owned by exactly one [`crate::proxy::TwoStageProxy`]
/// and never has more than one live in-flight token at a time; the sequence
/// counter exists purely as a misuse detector (see [`CallError::StaleToken`]).
pub struct TwoStageTransport {
    seq: Mutex<u64>,
}

impl Default for TwoStageTransport {
    fn default() -> Self {
        TwoStageTransport { seq: Mutex::new(0) }
    }
}

impl TwoStageTransport {
    /// Construct a fresh, idle transport.
    pub fn new() -> TwoStageTransport {
        TwoStageTransport::default()
    }

    /// Open a connection, write the HTTP request, and return a token for
    /// the deferred read phase.
    ///
    /// Bumps the sequence counter before attempting to connect, so a failed
    /// connect still invalidates any token from a previous call on this
    /// transport.
    pub fn start(&self, host: &str, path: &str, body: &str, verbose: bool) -> Result<InFlightToken, CallError> {
        let seq = {
            let mut guard = self.seq.lock().expect("transport mutex poisoned");
            *guard += 1;
            *guard
        };

        trace!("transport: starting call #{seq} to {host}{path}");

        let stream = TcpStream::connect(host).map_err(|source| CallError::Connect {
            host: host.to_owned(),
            source,
        })?;
        stream.set_nodelay(true).ok();

        let mut stream = stream;
        write_request(&mut stream, host, path, body).map_err(CallError::Write)?;

        Ok(InFlightToken { stream, verbose, seq })
    }

    /// Return the underlying socket handle for readiness polling.
    ///
    /// # Errors
    /// Returns [`CallError::StaleToken`] if `token` was issued by an earlier
    /// call on this transport that has since been superseded.
    #[cfg(unix)]
    pub fn socket(&self, token: &InFlightToken) -> Result<RawFd, CallError> {
        self.check_current(token)?;
        Ok(token.stream.as_raw_fd())
    }

    /// Non-blocking readiness check: true iff the socket is readable or in
    /// an error state. A `poll(2)` failure also returns true, so that
    /// `finish` is invoked and surfaces the underlying error rather than
    /// spinning forever.
    #[cfg(unix)]
    pub fn is_ready(&self, token: &InFlightToken) -> bool {
        let fd = token.stream.as_raw_fd();
        let mut pollfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };

        // SAFETY: `pollfd` is a single, valid, stack-local fd entry, and the
        // slice length we pass matches it.
        let rv = unsafe { libc::poll(&mut pollfd, 1, 0) };

        if rv < 0 {
            return true;
        }
        if rv == 0 {
            return false;
        }

        pollfd.revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0
    }

    /// Read the response, parse it, and return the decoded values.
    ///
    /// Closes the connection on any failure path; on success the connection
    /// is also dropped, since this transport never reuses connections across
    /// calls.
    pub fn finish(&self, token: InFlightToken) -> Result<Vec<Value>, CallError> {
        self.check_current(&token)?;

        let InFlightToken { mut stream, verbose, seq } = token;
        debug!("transport: finishing call #{seq}");

        let result = read_response(&mut stream, verbose);
        // The connection is never reused regardless of outcome; dropping
        // `stream` here closes it.
        result
    }

    fn check_current(&self, token: &InFlightToken) -> Result<(), CallError> {
        let guard = self.seq.lock().expect("transport mutex poisoned");
        if *guard != token.seq {
            warn!("transport: stale token (token seq {}, current seq {})", token.seq, *guard);
            return Err(CallError::StaleToken);
        }
        Ok(())
    }
}

fn write_request(stream: &mut TcpStream, host: &str, path: &str, body: &str) -> std::io::Result<()> {
    let head = format!(
        "POST {path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: {USER_AGENT}\r\n\
         Content-Type: text/xml\r\n\
         Content-Length: {len}\r\n\
         Connection: close\r\n\
         \r\n",
        path = path,
        host = host,
        len = body.len(),
    );

    stream.write_all(head.as_bytes())?;
    stream.write_all(body.as_bytes())?;
    stream.flush()
}

fn read_response(stream: &mut TcpStream, verbose: bool) -> Result<Vec<Value>, CallError> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).map_err(|e| CallError::Http(e.to_string()))?;
        if n == 0 {
            return Err(CallError::Http("connection closed before headers were complete".into()));
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = find_header_end(&buf) {
            break end;
        }
        if buf.len() > 64 * 1024 {
            return Err(CallError::Http("response headers too large".into()));
        }
    };

    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut response = httparse::Response::new(&mut headers);
    let parsed = response
        .parse(&buf[..header_end])
        .map_err(|e| CallError::Http(format!("malformed HTTP response: {e}")))?;
    if parsed.is_partial() {
        return Err(CallError::Http("incomplete HTTP status line".into()));
    }

    let status = response.code.unwrap_or(0);
    if verbose {
        trace!("transport: response status {status}");
    }

    let content_length = response
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("content-length"))
        .and_then(|h| std::str::from_utf8(h.value).ok())
        .and_then(|v| v.trim().parse::<usize>().ok());

    let mut body = buf[header_end..].to_vec();

    match content_length {
        Some(len) => {
            while body.len() < len {
                let n = stream.read(&mut chunk).map_err(|e| CallError::Http(e.to_string()))?;
                if n == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..n]);
            }
            body.truncate(len);
        }
        None => loop {
            let n = stream.read(&mut chunk).map_err(|e| CallError::Http(e.to_string()))?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        },
    }

    if status != 200 {
        return Err(CallError::Status { status });
    }

    let text = String::from_utf8_lossy(&body);
    decode_body(&text)
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4)
}

/// Decode a method response body, distinguishing a successful response from
/// a protocol-level fault.
///
/// A missing `<params>` tag is ambiguous between "empty successful
/// response" and "fault response", so faults are checked for first, exactly
/// as the reference implementation does.
fn decode_body(body: &str) -> Result<Vec<Value>, CallError> {
    if let Ok(fault) = dxr::deserialize_xml::<FaultResponse>(body) {
        let fault: Fault = Fault::try_from(fault).map_err(CallError::Decode)?;
        return Err(CallError::Fault(fault));
    }

    match dxr::deserialize_xml::<MethodResponse>(body) {
        Ok(response) => Ok(response.into_inner()),
        Err(_) => Err(CallError::Decode(dxr::DxrError::invalid_data(body.to_owned()))),
    }
}
