use std::collections::{HashMap, VecDeque};

use dxr::{DxrError, Value};
use log::trace;

use super::{CallResult, Fallback};
use crate::error::CallError;
use crate::proxy::{ProxyHandle, RequestFormat, StartOutcome, TwoStageProxy};

/// The pipelined fan-out strategy: split the call into a write phase and a
/// read phase across every two-stage-capable proxy, so their round trips
/// overlap on the wire instead of running one after another.
///
/// Algorithm (see spec section on the two-stage dispatcher):
/// 1. Partition proxies into two-stage-capable (`T`) and other (`O`).
/// 2. Deduplicate encoding: group `T` by [`RequestFormat`] and encode each
///    distinct group's request body exactly once.
/// 3. Issue writes for every proxy in `T`.
/// 4. Run the fallback dispatcher on `O`.
/// 5. Poll all live sockets for readiness, finishing each as it becomes
///    ready, until none remain.
/// 6. Finish any writes that failed outright (no socket to wait on) last.
#[derive(Default)]
pub struct TwoStage {
    fallback: Fallback,
}

impl TwoStage {
    /// Construct a two-stage dispatcher using `fallback` for non-two-stage
    /// proxies.
    pub fn new(fallback: Fallback) -> TwoStage {
        TwoStage { fallback }
    }

    /// Run the fan-out, collecting every result into a `Vec`.
    pub fn fanout(&self, proxies: &[ProxyHandle], method: &str, params: &[Value]) -> Vec<CallResult> {
        self.fanout_iter(proxies, method, params).collect()
    }

    /// Run the fan-out as a lazy sequence: results become available as soon
    /// as they arrive, rather than only once every endpoint has responded.
    pub fn fanout_iter(&self, proxies: &[ProxyHandle], method: &str, params: &[Value]) -> TwoStageIter<'_> {
        let mut others = Vec::new();
        let mut two_stage: Vec<&TwoStageProxy> = Vec::new();

        for proxy in proxies {
            match proxy {
                ProxyHandle::TwoStage(p) => two_stage.push(p),
                ProxyHandle::Plain(_) => others.push(proxy),
            }
        }

        // Encode each distinct request-format group exactly once, caching
        // either the body or the (stringified) reason it failed so every
        // proxy sharing that format can be resolved without re-encoding.
        let mut bodies: HashMap<&RequestFormat, Result<String, String>> = HashMap::new();
        for proxy in &two_stage {
            let format = proxy.request_format();
            if !bodies.contains_key(format) {
                let outcome = proxy.make_request(method, params).map_err(|e| e.to_string());
                bodies.insert(format, outcome);
            }
        }

        let mut pending = Vec::with_capacity(two_stage.len());
        let mut failed = VecDeque::new();

        for proxy in two_stage {
            match bodies.get(proxy.request_format()).expect("format was just inserted above") {
                Ok(body) => match proxy.start_request(body) {
                    outcome @ StartOutcome::Started(_) => pending.push((proxy, outcome)),
                    outcome @ StartOutcome::Failed(_) => failed.push_back((proxy, outcome)),
                },
                Err(reason) => {
                    let error = CallError::Encode(DxrError::invalid_data(reason.clone()));
                    failed.push_back((proxy, StartOutcome::Failed(error)));
                }
            }
        }

        trace!(
            "two-stage fan-out: {} others, {} started, {} failed to start",
            others.len(),
            pending.len(),
            failed.len()
        );

        let other_results: VecDeque<CallResult> = self.fallback.fanout(&others, method, params).into();

        TwoStageIter {
            others: other_results,
            pending,
            ready: VecDeque::new(),
            failed,
        }
    }
}

/// Lazy result sequence produced by [`TwoStage::fanout_iter`].
pub struct TwoStageIter<'a> {
    others: VecDeque<CallResult>,
    pending: Vec<(&'a TwoStageProxy, StartOutcome)>,
    ready: VecDeque<(&'a TwoStageProxy, StartOutcome)>,
    failed: VecDeque<(&'a TwoStageProxy, StartOutcome)>,
}

impl<'a> Iterator for TwoStageIter<'a> {
    type Item = CallResult;

    fn next(&mut self) -> Option<CallResult> {
        if let Some(result) = self.others.pop_front() {
            return Some(result);
        }

        loop {
            if let Some((proxy, outcome)) = self.ready.pop_front() {
                return Some(proxy.finish_request(outcome));
            }
            if self.pending.is_empty() {
                break;
            }
            self.poll_once();
        }

        if let Some((proxy, outcome)) = self.failed.pop_front() {
            return Some(proxy.finish_request(outcome));
        }

        None
    }
}

impl<'a> TwoStageIter<'a> {
    #[cfg(unix)]
    fn poll_once(&mut self) {
        let mut fds: Vec<libc::pollfd> = self
            .pending
            .iter()
            .map(|(proxy, outcome)| libc::pollfd {
                fd: proxy.socket(outcome).unwrap_or(-1),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        // SAFETY: `fds` is a live, correctly-sized Vec for the duration of
        // the call; poll(2) only reads/writes within that bound.
        let rv = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };

        if rv < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return;
            }
            // Readiness polling itself is broken; surface every remaining
            // proxy's result via its own finish_request (which will in turn
            // hit the same underlying error) rather than hanging forever.
            self.ready.extend(self.pending.drain(..));
            return;
        }

        for i in (0..fds.len()).rev() {
            if fds[i].revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0 {
                self.ready.push_back(self.pending.remove(i));
            }
        }
    }

    #[cfg(not(unix))]
    fn poll_once(&mut self) {
        // No portable non-blocking readiness primitive without an extra
        // dependency on this platform; finish in FIFO order instead. Still
        // correct, just not pipelined.
        if let Some(entry) = self.pending.pop() {
            self.ready.push_back(entry);
        }
    }
}
