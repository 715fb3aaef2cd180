//! # dxr
//!
//! A small XML-RPC value codec: the types needed to represent XML-RPC calls,
//! responses, and faults, and to serialize/deserialize them to and from the
//! wire format via [`quick_xml`] and [`serde`].
//!
//! This crate only speaks XML; it has no opinion about how the bytes get to
//! and from a peer. That's left to transport-layer code (see the
//! `parallelrpc` crate in this workspace for one such transport).

mod call;
mod error;
mod fault;
mod value;

#[cfg(test)]
mod tests;

pub use call::{Call, MethodCall, MethodResponse, ToDXR, TryFromValue, TryToParams};
pub use error::DxrError;
pub use fault::{Fault, FaultResponse};
pub use value::{Array, Member, Struct, Value, XML_RPC_DATE_FORMAT};

/// Serialize any of this crate's wire types (a [`MethodCall`],
/// [`MethodResponse`], [`FaultResponse`], or [`Value`]) to an XML string.
///
/// The caller is responsible for prepending the `<?xml version="1.0"?>`
/// prologue if the bytes are going out over the wire as a full document.
pub fn serialize_xml<T>(value: &T) -> Result<String, quick_xml::SeError>
where
    T: serde::Serialize,
{
    quick_xml::se::to_string(value)
}

/// Deserialize an XML document into one of this crate's wire types.
pub fn deserialize_xml<T>(xml: &str) -> Result<T, quick_xml::DeError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    quick_xml::de::from_str(xml)
}
