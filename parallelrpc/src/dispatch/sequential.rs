use dxr::Value;

use super::CallResult;
use crate::proxy::ProxyHandle;

/// Reference implementation: call each proxy in turn, preserving input
/// order. No parallelism.
pub struct Sequential;

impl Sequential {
    /// Run every proxy's call one after another, in input order.
    pub fn fanout(&self, proxies: &[ProxyHandle], method: &str, params: &[Value]) -> Vec<CallResult> {
        proxies.iter().map(|proxy| proxy.request(method, params)).collect()
    }
}
