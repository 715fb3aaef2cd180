//! # Simple example server
//!
//! This crate is the XML-RPC value codec only; it has no listener of its
//! own. This example shows the handler side of the round trip: decode a
//! `<methodCall>`, dispatch on the method name, encode the `<methodResponse>`
//! (or `<fault>`) to send back. Wiring this up to an actual socket is what
//! the `parallelrpc` crate's transport module does for the client side of
//! a call; a server-side listener is out of scope for this workspace.

use dxr::{Fault, FaultResponse, MethodCall, MethodResponse, ToDXR, TryFromValue};

fn hello(params: &[dxr::Value]) -> Result<dxr::Value, Fault> {
    let name = params
        .first()
        .ok_or_else(|| Fault::new(1, "missing argument 'name'".to_owned()))
        .and_then(|value| String::try_from_value(value).map_err(|error| Fault::new(2, error.to_string())))?;

    format!("Hello, {name}!").to_dxr().map_err(|error| Fault::new(3, error.to_string()))
}

fn main() {
    let request_body = "<methodCall><methodName>hello</methodName><params><param><value><string>DXR</string></value></param></params></methodCall>";
    let call: MethodCall = dxr::deserialize_xml(request_body).expect("failed to parse call");

    let response_body = match call.name() {
        "hello" => match hello(&call.params()) {
            Ok(value) => dxr::serialize_xml(&MethodResponse::new(value)),
            Err(fault) => dxr::serialize_xml(&FaultResponse::new(fault).expect("failed to encode fault")),
        },
        other => {
            let fault = Fault::new(404, format!("no such method: {other}"));
            dxr::serialize_xml(&FaultResponse::new(fault).expect("failed to encode fault"))
        }
    }
    .expect("failed to serialize response");

    println!("{response_body}");
}
