use dxr::Value;

use super::{CallResult, Fallback, TwoStage};
use crate::proxy::ProxyHandle;

/// [`TwoStage`] with [`super::Threaded`] as its fallback, for deployments
/// where most endpoints are reachable over loopback (two-stage-eligible)
/// but a few are not.
///
/// The host-gating policy that restricts two-stage wrapping to loopback
/// endpoints by default lives in [`crate::facade::ParallelProxy::new`],
/// since it only matters at proxy-construction time; by the time a
/// `Hybrid` dispatcher sees a [`ProxyHandle::Plain`] proxy, it just runs it
/// through the threaded fallback like any other non-two-stage proxy.
pub struct Hybrid {
    inner: TwoStage,
}

impl Default for Hybrid {
    fn default() -> Hybrid {
        Hybrid::new()
    }
}

impl Hybrid {
    /// Construct a Hybrid dispatcher.
    pub fn new() -> Hybrid {
        Hybrid {
            inner: TwoStage::new(Fallback::Threaded),
        }
    }

    /// Run the fan-out, collecting every result into a `Vec`.
    pub fn fanout(&self, proxies: &[ProxyHandle], method: &str, params: &[Value]) -> Vec<CallResult> {
        self.inner.fanout(proxies, method, params)
    }
}
