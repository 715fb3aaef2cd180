//! # parallelrpc
//!
//! A client-side fan-out engine: dispatch one XML-RPC call to many servers
//! in parallel and collect one result per server.
//!
//! This crate only implements the *dispatch* side of the problem; the
//! XML-RPC value codec and wire envelopes it calls out to live in the
//! sibling [`dxr`] crate. Four interchangeable strategies are provided
//! (see [`dispatch::Strategy`]), trading implementation complexity for
//! throughput: a reference sequential dispatcher, a thread-per-call
//! dispatcher, a single-threaded pipelined dispatcher that overlaps writes
//! and reads across every endpoint, and a hybrid of the two pipelined
//! dispatchers that falls back to threads for endpoints that cannot use the
//! pipelined path.
//!
//! ```no_run
//! use dxr::Value;
//! use parallelrpc::{ParallelProxy, ParallelProxyOptions};
//!
//! let proxy = ParallelProxy::new(
//!     vec!["http://localhost:9001/RPC2", "http://localhost:9002/RPC2"],
//!     ParallelProxyOptions::default(),
//! )
//! .unwrap();
//!
//! for (value, error) in proxy.call("echo", &[Value::string("hi".to_owned())]) {
//!     match (value, error) {
//!         (Some(value), _) => println!("got {value:?}"),
//!         (_, Some(error)) => eprintln!("call failed: {error}"),
//!         (None, None) => unreachable!("every result carries a value or an error"),
//!     }
//! }
//! ```

mod endpoint;
mod facade;
mod proxy;
mod transport;

pub mod dispatch;
pub mod error;

pub use dispatch::{CallResult, Fallback, Strategy};
pub use endpoint::{Endpoint, HostClass};
pub use error::{CallError, ConstructionError};
pub use facade::{ParallelProxy, ParallelProxyOptions, ServerSpec};
pub use proxy::{PlainProxy, ProxyHandle, RequestFormat, StartOutcome, TwoStageProxy};
