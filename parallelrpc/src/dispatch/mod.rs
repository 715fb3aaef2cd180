//! Fan-out dispatch strategies.
//!
//! All four strategies share one contract: given a slice of per-endpoint
//! proxies, a method name, and a parameter list, produce exactly one
//! `(value, error)` result per proxy. They differ only in how much
//! parallelism they extract from the underlying network calls.

mod hybrid;
mod sequential;
mod threaded;
mod two_stage;

pub use hybrid::Hybrid;
pub use sequential::Sequential;
pub use threaded::Threaded;
pub use two_stage::TwoStage;

use dxr::Value;

use crate::error::CallError;
use crate::proxy::ProxyHandle;

/// One endpoint's result: exactly one of `.0`/`.1` is populated.
pub type CallResult = (Option<Value>, Option<CallError>);

/// Which fallback dispatcher [`TwoStage`] uses for proxies that are not
/// two-stage-capable.
#[derive(Debug, Clone, Copy, Default)]
pub enum Fallback {
    /// [`Sequential`] (the default for plain [`TwoStage`]).
    #[default]
    Sequential,
    /// [`Threaded`] (used by [`Hybrid`]).
    Threaded,
}

impl Fallback {
    fn fanout(self, proxies: &[ProxyHandle], method: &str, params: &[Value]) -> Vec<CallResult> {
        match self {
            Fallback::Sequential => Sequential.fanout(proxies, method, params),
            Fallback::Threaded => Threaded.fanout(proxies, method, params),
        }
    }
}

/// Tag identifying one of the four fan-out strategies.
///
/// A tagged enum in place of the source's class-generation factory
/// (`_make_psp`): the four strategies share a contract, not a base class, so
/// one type parameterized by this enum stands in for four near-identical
/// generated classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Reference/fallback implementation: no parallelism.
    Sequential,
    /// One OS thread per proxy.
    Threaded,
    /// Pipelined write/read split, single-threaded.
    TwoStage,
    /// [`Strategy::TwoStage`] with [`Strategy::Threaded`] as its fallback,
    /// and host-gated two-stage eligibility at construction time.
    Hybrid,
}

impl Strategy {
    /// Run this strategy's fan-out over `proxies`.
    pub fn fanout(&self, proxies: &[ProxyHandle], method: &str, params: &[Value]) -> Vec<CallResult> {
        match self {
            Strategy::Sequential => Sequential.fanout(proxies, method, params),
            Strategy::Threaded => Threaded.fanout(proxies, method, params),
            Strategy::TwoStage => TwoStage::default().fanout(proxies, method, params),
            Strategy::Hybrid => Hybrid::new().fanout(proxies, method, params),
        }
    }

    /// The `{Kind}` used in the facade's `Display` representation.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "Pretend",
            Strategy::Threaded => "Threaded",
            Strategy::TwoStage => "TwoStage",
            Strategy::Hybrid => "Hybrid",
        }
    }

    /// Whether this strategy restricts two-stage wrapping to loopback hosts
    /// by default (only [`Strategy::Hybrid`] does).
    pub fn default_localhost_only(&self) -> bool {
        matches!(self, Strategy::Hybrid)
    }

    /// Whether this strategy can make use of a two-stage-capable proxy at
    /// all (only [`Strategy::TwoStage`] and [`Strategy::Hybrid`] do).
    pub fn uses_two_stage(&self) -> bool {
        matches!(self, Strategy::TwoStage | Strategy::Hybrid)
    }
}
