use std::fmt;

use dxr::Value;

use crate::dispatch::{CallResult, Strategy};
use crate::endpoint::{Endpoint, HostClass};
use crate::error::ConstructionError;
use crate::proxy::{PlainProxy, ProxyHandle, TwoStageProxy};

/// One server to fan a call out to: either a URL to parse, or a
/// pre-constructed proxy handle.
pub enum ServerSpec {
    /// A URL, to be parsed and wrapped according to the facade's strategy
    /// and options.
    Url(String),
    /// A proxy object, used as-is.
    Proxy(ProxyHandle),
}

impl From<&str> for ServerSpec {
    fn from(url: &str) -> ServerSpec {
        ServerSpec::Url(url.to_owned())
    }
}

impl From<String> for ServerSpec {
    fn from(url: String) -> ServerSpec {
        ServerSpec::Url(url)
    }
}

impl From<ProxyHandle> for ServerSpec {
    fn from(proxy: ProxyHandle) -> ServerSpec {
        ServerSpec::Proxy(proxy)
    }
}

/// Construction-time options for a [`ParallelProxy`].
#[derive(Debug, Clone)]
pub struct ParallelProxyOptions {
    /// XML-RPC codec encoding; `None` uses the codec's default.
    pub encoding: Option<String>,
    /// Whether `nil`/`None` values are permitted in encoded requests.
    pub allow_none: bool,
    /// Whether date values decode to native datetimes (reserved for a
    /// future typed-response path; the untyped `Value` codec always
    /// produces a `dateTime.iso8601` value regardless).
    pub use_datetime: bool,
    /// Debug verbosity passed through to the transport.
    pub verbose: bool,
    /// Restrict two-stage wrapping to loopback endpoints. Defaults to the
    /// strategy's own default (`true` for [`Strategy::Hybrid`], `false`
    /// otherwise); set explicitly to override either way.
    pub tssp_localhost_only: Option<bool>,
    /// Which fan-out strategy the facade uses.
    pub strategy: Strategy,
}

impl Default for ParallelProxyOptions {
    fn default() -> ParallelProxyOptions {
        ParallelProxyOptions {
            encoding: None,
            allow_none: false,
            use_datetime: false,
            verbose: false,
            tssp_localhost_only: None,
            strategy: Strategy::Hybrid,
        }
    }
}

/// User-facing fan-out client: holds one proxy per endpoint and routes any
/// call through the configured strategy.
///
/// In place of the source's attribute-forwarding trick (any attribute
/// access on the facade becomes an RPC method name), this exposes a single
/// typed `call` operation; a code-generation step for per-method wrappers is
/// explicitly out of scope.
pub struct ParallelProxy {
    proxies: Vec<ProxyHandle>,
    strategy: Strategy,
}

impl ParallelProxy {
    /// Construct a facade from a list of server specifiers and options.
    ///
    /// For each [`ServerSpec::Url`]: if two-stage eligibility holds (the
    /// strategy uses two-stage proxies, and the host policy permits this
    /// endpoint) and the scheme is `http`, a [`TwoStageProxy`] is
    /// constructed; otherwise, or on an unsupported scheme, a [`PlainProxy`]
    /// is constructed instead. [`ServerSpec::Proxy`] entries are used as-is.
    ///
    /// Construction only fails if a URL cannot be parsed into a URL at all
    /// (malformed authority); an unsupported *scheme* never fails
    /// construction, per the endpoint URL grammar.
    pub fn new<I, S>(servers: I, options: ParallelProxyOptions) -> Result<ParallelProxy, ConstructionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<ServerSpec>,
    {
        let localhost_only = options.tssp_localhost_only.unwrap_or_else(|| options.strategy.default_localhost_only());

        let mut proxies = Vec::new();
        for spec in servers {
            let proxy = match spec.into() {
                ServerSpec::Proxy(proxy) => proxy,
                ServerSpec::Url(url) => Self::build_proxy(&url, &options, localhost_only)?,
            };
            proxies.push(proxy);
        }

        Ok(ParallelProxy {
            proxies,
            strategy: options.strategy,
        })
    }

    fn build_proxy(url: &str, options: &ParallelProxyOptions, localhost_only: bool) -> Result<ProxyHandle, ConstructionError> {
        let endpoint = match Endpoint::parse(url) {
            Ok(endpoint) => endpoint,
            Err(ConstructionError::UnknownProtocol(_)) => {
                return Ok(ProxyHandle::Plain(PlainProxy::unsupported(url.to_owned())));
            }
            Err(error @ ConstructionError::MalformedUrl(_)) => return Err(error),
        };

        let eligible = options.strategy.uses_two_stage() && (!localhost_only || endpoint.host_class() == HostClass::Loopback);

        if eligible {
            Ok(ProxyHandle::TwoStage(TwoStageProxy::new(
                endpoint,
                options.encoding.clone(),
                options.allow_none,
                options.verbose,
            )))
        } else {
            Ok(ProxyHandle::Plain(PlainProxy::http(
                endpoint,
                options.encoding.clone(),
                options.allow_none,
                options.verbose,
            )))
        }
    }

    /// Call `method(params)` on every endpoint, returning one result per
    /// endpoint in whichever order the configured strategy produces them.
    pub fn call(&self, method: &str, params: &[Value]) -> Vec<CallResult> {
        self.strategy.fanout(&self.proxies, method, params)
    }

    /// Number of endpoints held by this facade.
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Whether this facade holds no endpoints.
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

impl fmt::Display for ParallelProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}ParallelServerProxy for {} servers>",
            self.strategy.kind_name(),
            self.proxies.len()
        )
    }
}

impl fmt::Debug for ParallelProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
