//! # Simple example client
//!
//! This crate only implements the XML-RPC value codec, not a transport; the
//! `parallelrpc` crate in this workspace is what actually puts these bytes
//! on a wire. This example just shows the encode/decode round trip in
//! isolation.

use dxr::{Call, MethodResponse, TryFromValue};

fn main() {
    let request: Call<(String,), String> = Call::new(String::from("hello"), (String::from("DXR"),));
    let method_call = request.as_xml_rpc().expect("failed to encode call");
    let body = dxr::serialize_xml(&method_call).expect("failed to serialize call");

    println!("request:\n{body}\n");

    // Stand in for whatever arrived over the wire.
    let response_body = "<methodResponse><params><param><value><string>Hello, DXR!</string></value></param></params></methodResponse>";
    let response: MethodResponse = dxr::deserialize_xml(response_body).expect("failed to parse response");
    let value = response.inner().expect("response did not carry exactly one param");
    let greeting = String::try_from_value(&value).expect("unexpected response type");

    println!("response: {greeting}");
}
