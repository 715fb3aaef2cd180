use std::sync::mpsc;
use std::thread;

use dxr::Value;

use super::CallResult;
use crate::proxy::ProxyHandle;

/// Spawn one worker per proxy, running [`super::Sequential`]'s per-proxy
/// path, and wait for all of them to finish.
///
/// Results are returned in completion order, not input order: a single
/// `mpsc` channel collects them as each worker finishes, which also avoids
/// the unsynchronized shared-list append the reference implementation
/// relies on the GIL to make safe.
pub struct Threaded;

impl Threaded {
    /// Run every proxy's call on its own thread and collect the results as
    /// they complete.
    pub fn fanout(&self, proxies: &[ProxyHandle], method: &str, params: &[Value]) -> Vec<CallResult> {
        if proxies.is_empty() {
            return Vec::new();
        }

        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for proxy in proxies {
                let tx = tx.clone();
                scope.spawn(move || {
                    let result = proxy.request(method, params);
                    // The receiver always outlives every worker (it is
                    // dropped only after this scope returns), so a send
                    // failure here would be a bug, not a runtime condition.
                    let _ = tx.send(result);
                });
            }
            drop(tx);
        });

        rx.into_iter().collect()
    }
}
