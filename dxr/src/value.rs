use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DxrError;

/// `strftime`/`strptime` format used for `<dateTime.iso8601>` values.
///
/// XML-RPC's date format is not quite ISO 8601 (no separators between date
/// fields, no timezone), so [`chrono`]'s built-in RFC 3339 parsing cannot be
/// used directly.
pub const XML_RPC_DATE_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// A single XML-RPC value.
///
/// Construct instances with the `Value::<type>(...)` constructors rather
/// than the enum variants directly; the constructors take care of the
/// non-obvious wire representations (booleans as `0`/`1`, binary data as
/// base64, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "value")]
pub struct Value {
    #[serde(rename = "$value")]
    inner: Scalar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum Scalar {
    #[serde(rename = "i4", alias = "int")]
    I4(i32),

    #[cfg(feature = "i8")]
    #[serde(rename = "i8")]
    I8(i64),

    #[serde(rename = "boolean")]
    Boolean(u8),

    #[serde(rename = "string")]
    String(String),

    #[serde(rename = "double")]
    Double(f64),

    #[serde(rename = "dateTime.iso8601", with = "datetime_format")]
    DateTime(DateTime<Utc>),

    #[serde(rename = "base64", with = "base64_format")]
    Base64(Vec<u8>),

    #[serde(rename = "struct")]
    Struct(Struct),

    #[serde(rename = "array")]
    Array(Array),

    #[cfg(feature = "nil")]
    #[serde(rename = "nil")]
    Nil,
}

impl Value {
    /// Construct a 32-bit integer value (`<i4>`).
    pub fn i4(value: i32) -> Value {
        Value { inner: Scalar::I4(value) }
    }

    /// Construct a 64-bit integer value (`<i8>`, non-standard extension).
    #[cfg(feature = "i8")]
    pub fn i8(value: i64) -> Value {
        Value { inner: Scalar::I8(value) }
    }

    /// Construct a boolean value (`<boolean>`).
    pub fn boolean(value: bool) -> Value {
        Value {
            inner: Scalar::Boolean(if value { 1 } else { 0 }),
        }
    }

    /// Construct a string value (`<string>`).
    pub fn string(value: String) -> Value {
        Value { inner: Scalar::String(value) }
    }

    /// Construct a floating point value (`<double>`).
    pub fn double(value: f64) -> Value {
        Value { inner: Scalar::Double(value) }
    }

    /// Construct a date/time value (`<dateTime.iso8601>`).
    pub fn datetime(value: DateTime<Utc>) -> Value {
        Value { inner: Scalar::DateTime(value) }
    }

    /// Construct a binary value (`<base64>`).
    pub fn base64(value: Vec<u8>) -> Value {
        Value { inner: Scalar::Base64(value) }
    }

    /// Construct a struct value (`<struct>`).
    pub fn structure(value: Struct) -> Value {
        Value { inner: Scalar::Struct(value) }
    }

    /// Construct an array value (`<array>`).
    pub fn array(value: Array) -> Value {
        Value { inner: Scalar::Array(value) }
    }

    /// Construct the non-standard nil value (`<nil/>`).
    #[cfg(feature = "nil")]
    pub fn nil() -> Value {
        Value { inner: Scalar::Nil }
    }

    /// Name of the XML-RPC type this value holds, for error messages.
    pub fn type_name(&self) -> &'static str {
        match &self.inner {
            Scalar::I4(_) => "i4",
            #[cfg(feature = "i8")]
            Scalar::I8(_) => "i8",
            Scalar::Boolean(_) => "boolean",
            Scalar::String(_) => "string",
            Scalar::Double(_) => "double",
            Scalar::DateTime(_) => "dateTime.iso8601",
            Scalar::Base64(_) => "base64",
            Scalar::Struct(_) => "struct",
            Scalar::Array(_) => "array",
            #[cfg(feature = "nil")]
            Scalar::Nil => "nil",
        }
    }

    pub(crate) fn as_i4(&self) -> Result<i32, DxrError> {
        match self.inner {
            Scalar::I4(v) => Ok(v),
            _ => Err(DxrError::wrong_type("i4", self.type_name())),
        }
    }

    pub(crate) fn as_boolean(&self) -> Result<bool, DxrError> {
        match self.inner {
            Scalar::Boolean(v) => Ok(v != 0),
            _ => Err(DxrError::wrong_type("boolean", self.type_name())),
        }
    }

    pub(crate) fn as_string(&self) -> Result<&str, DxrError> {
        match &self.inner {
            Scalar::String(v) => Ok(v.as_str()),
            _ => Err(DxrError::wrong_type("string", self.type_name())),
        }
    }

    pub(crate) fn as_double(&self) -> Result<f64, DxrError> {
        match self.inner {
            Scalar::Double(v) => Ok(v),
            _ => Err(DxrError::wrong_type("double", self.type_name())),
        }
    }

    pub(crate) fn as_array(&self) -> Result<&Array, DxrError> {
        match &self.inner {
            Scalar::Array(v) => Ok(v),
            _ => Err(DxrError::wrong_type("array", self.type_name())),
        }
    }

    pub(crate) fn as_struct(&self) -> Result<&Struct, DxrError> {
        match &self.inner {
            Scalar::Struct(v) => Ok(v),
            _ => Err(DxrError::wrong_type("struct", self.type_name())),
        }
    }
}

/// A named member of a [`Struct`]: `<member><name>...</name><value>...</value></member>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "member")]
pub struct Member {
    name: String,
    value: Value,
}

impl Member {
    /// Construct a struct member from its name and value.
    pub fn new(name: String, value: Value) -> Member {
        Member { name, value }
    }

    /// The member's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member's value.
    pub fn inner(&self) -> &Value {
        &self.value
    }
}

/// An XML-RPC struct: an ordered list of named members.
///
/// XML-RPC structs are unordered sets of members in the spec, but this type
/// preserves wire order since that is what the derive-based codec naturally
/// produces, and callers rarely care either way.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename = "struct")]
pub struct Struct {
    #[serde(rename = "member", default)]
    members: Vec<Member>,
}

impl Struct {
    /// Build a struct from a list of members.
    pub fn from_members(members: Vec<Member>) -> Struct {
        Struct { members }
    }

    /// The struct's members, in wire order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Look up a member by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.iter().find(|m| m.name == name).map(|m| &m.value)
    }
}

/// An XML-RPC array: `<array><data>...</data></array>`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename = "array")]
pub struct Array {
    data: ArrayData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename = "data")]
struct ArrayData {
    #[serde(rename = "value", default)]
    values: Vec<Value>,
}

impl Array {
    /// Build an array from a list of elements.
    pub fn from_elements(values: Vec<Value>) -> Array {
        Array {
            data: ArrayData { values },
        }
    }

    /// The array's elements, in order.
    pub fn elements(&self) -> &[Value] {
        &self.data.values
    }

    /// Consume the array, returning its elements.
    pub fn into_elements(self) -> Vec<Value> {
        self.data.values
    }
}

mod datetime_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::XML_RPC_DATE_FORMAT;

    pub(crate) fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(XML_RPC_DATE_FORMAT).to_string())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(&raw, XML_RPC_DATE_FORMAT).map_err(serde::de::Error::custom)?;
        Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }
}

mod base64_format {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        STANDARD.decode(raw.as_bytes()).map_err(serde::de::Error::custom)
    }
}
