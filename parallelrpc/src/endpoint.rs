use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::ConstructionError;

/// A parsed, immutable XML-RPC endpoint URL.
///
/// Only the `http` scheme is supported; see spec section on the endpoint URL
/// grammar. A missing path defaults to `/RPC2`, matching the long-standing
/// `xmlrpclib` convention this engine is compatible with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
    path: String,
}

impl Endpoint {
    /// Parse an endpoint URL of the form `http://host[:port][/path]`.
    pub fn parse(url: &str) -> Result<Endpoint, ConstructionError> {
        let rest = url
            .strip_prefix("http://")
            .ok_or_else(|| ConstructionError::UnknownProtocol(url.to_owned()))?;

        let (authority, path) = match rest.find('/') {
            Some(index) => (&rest[..index], &rest[index..]),
            None => (rest, ""),
        };

        if authority.is_empty() {
            return Err(ConstructionError::MalformedUrl(url.to_owned()));
        }

        let (host, port) = split_authority(authority)?;
        let path = if path.is_empty() { "/RPC2".to_owned() } else { path.to_owned() };

        Ok(Endpoint { host, port, path })
    }

    /// The endpoint's host (without port).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The endpoint's port, defaulting to 80 for plain HTTP.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The endpoint's request path, e.g. `/RPC2`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `host:port`, suitable for `TcpStream::connect`.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Classify the endpoint's host as loopback or remote.
    ///
    /// Used by [`crate::dispatch::Hybrid`]'s host-gating policy. Unlike the
    /// original implementation's `'://127.0.0.' in s` substring check, this
    /// parses the host properly so `http://[::1]:PORT/` and bracketed IPv6
    /// literals in general classify correctly.
    pub fn host_class(&self) -> HostClass {
        if self.host.eq_ignore_ascii_case("localhost") {
            return HostClass::Loopback;
        }

        let bracket_stripped = self.host.strip_prefix('[').and_then(|h| h.strip_suffix(']'));

        if let Ok(addr) = bracket_stripped.unwrap_or(&self.host).parse::<IpAddr>() {
            return match addr {
                IpAddr::V4(v4) => {
                    if is_loopback_v4(&v4) {
                        HostClass::Loopback
                    } else {
                        HostClass::Remote
                    }
                }
                IpAddr::V6(v6) => {
                    if is_loopback_v6(&v6) {
                        HostClass::Loopback
                    } else {
                        HostClass::Remote
                    }
                }
            };
        }

        HostClass::Remote
    }
}

fn is_loopback_v4(addr: &Ipv4Addr) -> bool {
    addr.octets()[0] == 127
}

fn is_loopback_v6(addr: &Ipv6Addr) -> bool {
    addr.is_loopback()
}

fn split_authority(authority: &str) -> Result<(String, u16), ConstructionError> {
    // Bracketed IPv6 literal, e.g. "[::1]:8080" or "[::1]".
    if let Some(rest) = authority.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => {
                let host = format!("[{}]", &rest[..end]);
                let after = &rest[end + 1..];
                let port = match after.strip_prefix(':') {
                    Some(p) => p.parse().map_err(|_| ConstructionError::MalformedUrl(authority.to_owned()))?,
                    None => 80,
                };
                Ok((host, port))
            }
            None => Err(ConstructionError::MalformedUrl(authority.to_owned())),
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().map_err(|_| ConstructionError::MalformedUrl(authority.to_owned()))?;
            Ok((host.to_owned(), port))
        }
        None => Ok((authority.to_owned(), 80)),
    }
}

/// Whether an endpoint's host is loopback or remote, per [`Endpoint::host_class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostClass {
    /// `localhost`, `127.0.0.0/8`, or `::1`.
    Loopback,
    /// Anything else.
    Remote,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}{}", self.host, self.port, self.path)
    }
}
