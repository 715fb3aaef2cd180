mod support;

use dxr::Value;
use parallelrpc::{ParallelProxy, ParallelProxyOptions, Strategy};

use support::{fault_response, string_response, StubServer};

fn params() -> Vec<Value> {
    vec![Value::string("ping".to_owned())]
}

#[test]
fn sequential_happy_path() {
    let servers: Vec<StubServer> = vec![
        StubServer::start(1, &string_response("one")),
        StubServer::start(1, &string_response("two")),
        StubServer::start(1, &string_response("three")),
    ];
    let urls: Vec<String> = servers.iter().map(StubServer::url).collect();

    let options = ParallelProxyOptions {
        strategy: Strategy::Sequential,
        ..Default::default()
    };
    let proxy = ParallelProxy::new(urls, options).unwrap();
    let results = proxy.call("echo", &params());

    assert_eq!(results.len(), 3);
    for (value, error) in results {
        assert!(error.is_none());
        assert!(value.is_some());
    }
}

#[test]
fn threaded_happy_path() {
    let servers: Vec<StubServer> = (0..4).map(|i| StubServer::start(1, &string_response(&format!("v{i}")))).collect();
    let urls: Vec<String> = servers.iter().map(StubServer::url).collect();

    let options = ParallelProxyOptions {
        strategy: Strategy::Threaded,
        ..Default::default()
    };
    let proxy = ParallelProxy::new(urls, options).unwrap();
    let results = proxy.call("echo", &params());

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|(v, e)| v.is_some() && e.is_none()));
}

#[test]
fn two_stage_happy_path() {
    let servers: Vec<StubServer> = (0..5).map(|i| StubServer::start(1, &string_response(&format!("v{i}")))).collect();
    let urls: Vec<String> = servers.iter().map(StubServer::url).collect();

    let options = ParallelProxyOptions {
        strategy: Strategy::TwoStage,
        ..Default::default()
    };
    let proxy = ParallelProxy::new(urls, options).unwrap();
    let results = proxy.call("echo", &params());

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|(v, e)| v.is_some() && e.is_none()));
}

#[test]
fn hybrid_happy_path_on_loopback() {
    let servers: Vec<StubServer> = (0..3).map(|i| StubServer::start(1, &string_response(&format!("v{i}")))).collect();
    let urls: Vec<String> = servers.iter().map(StubServer::url).collect();

    // Default options select Hybrid and gate two-stage wrapping to loopback
    // hosts; every stub server is on 127.0.0.1, so all of them qualify.
    let proxy = ParallelProxy::new(urls, ParallelProxyOptions::default()).unwrap();
    let results = proxy.call("echo", &params());

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|(v, e)| v.is_some() && e.is_none()));
}

#[test]
fn unreachable_server_reports_error_without_blocking_others() {
    let good = StubServer::start(1, &string_response("ok"));
    // Nothing is listening on this port.
    let dead_url = "http://127.0.0.1:1".to_owned();

    let options = ParallelProxyOptions {
        strategy: Strategy::TwoStage,
        ..Default::default()
    };
    let proxy = ParallelProxy::new(vec![good.url(), dead_url], options).unwrap();
    let results = proxy.call("echo", &params());

    assert_eq!(results.len(), 2);
    let successes = results.iter().filter(|(v, _)| v.is_some()).count();
    let failures = results.iter().filter(|(_, e)| e.is_some()).count();
    assert_eq!(successes, 1);
    assert_eq!(failures, 1);
}

#[test]
fn fault_response_surfaces_as_call_error() {
    let server = StubServer::start(1, &fault_response(7, "method not found"));

    let options = ParallelProxyOptions {
        strategy: Strategy::Sequential,
        ..Default::default()
    };
    let proxy = ParallelProxy::new(vec![server.url()], options).unwrap();
    let mut results = proxy.call("missing", &params());
    let (value, error) = results.remove(0);

    assert!(value.is_none());
    match error {
        Some(parallelrpc::CallError::Fault(fault)) => {
            assert_eq!(fault.code(), 7);
            assert_eq!(fault.string(), "method not found");
        }
        other => panic!("expected a Fault error, got {other:?}"),
    }
}

#[test]
fn non_http_endpoint_falls_back_without_failing_construction() {
    let good = StubServer::start(1, &string_response("ok"));

    let options = ParallelProxyOptions {
        strategy: Strategy::Hybrid,
        ..Default::default()
    };
    let proxy = ParallelProxy::new(vec![good.url(), "ftp://example.com/".to_owned()], options).unwrap();
    let results = proxy.call("echo", &params());

    assert_eq!(results.len(), 2);
    let successes = results.iter().filter(|(v, _)| v.is_some()).count();
    let failures = results.iter().filter(|(_, e)| e.is_some()).count();
    assert_eq!(successes, 1);
    assert_eq!(failures, 1);
}

#[test]
fn hybrid_gates_two_stage_wrapping_to_loopback_by_default() {
    use parallelrpc::Endpoint;

    // A non-loopback host is not two-stage-eligible under Hybrid's default
    // gating policy; construction still succeeds (the facade just falls
    // back to a Plain proxy for this endpoint), which is what this checks.
    let options = ParallelProxyOptions {
        strategy: Strategy::Hybrid,
        ..Default::default()
    };
    let proxy = ParallelProxy::new(vec!["http://203.0.113.10/RPC2".to_owned()], options).unwrap();
    assert_eq!(proxy.len(), 1);

    let endpoint = Endpoint::parse("http://203.0.113.10/RPC2").unwrap();
    assert_eq!(endpoint.host_class(), parallelrpc::HostClass::Remote);
}

#[test]
fn display_reports_strategy_kind_and_server_count() {
    let server = StubServer::start(1, &string_response("ok"));
    let options = ParallelProxyOptions {
        strategy: Strategy::Threaded,
        ..Default::default()
    };
    let proxy = ParallelProxy::new(vec![server.url()], options).unwrap();
    assert_eq!(format!("{proxy}"), "<ThreadedParallelServerProxy for 1 servers>");
}
