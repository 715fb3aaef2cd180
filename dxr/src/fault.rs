use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DxrError;
use crate::value::Value;

/// An XML-RPC fault: an application-level error with an integer code and a
/// human-readable message, as opposed to a protocol- or transport-level
/// failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("XML-RPC fault {code}: {string}")]
pub struct Fault {
    code: i32,
    string: String,
}

impl Fault {
    /// Construct a fault from its code and message.
    pub fn new(code: i32, string: String) -> Fault {
        Fault { code, string }
    }

    /// The fault code.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// The fault's human-readable message.
    pub fn string(&self) -> &str {
        &self.string
    }
}

/// The `<methodResponse><fault>...</fault></methodResponse>` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "methodResponse")]
pub struct FaultResponse {
    fault: FaultValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "fault")]
struct FaultValue {
    value: Value,
}

impl FaultResponse {
    /// Wrap a [`Fault`] in a fault response envelope.
    pub fn new(fault: Fault) -> Result<FaultResponse, DxrError> {
        let mut members = Vec::new();
        members.push(crate::value::Member::new(
            "faultCode".to_owned(),
            Value::i4(fault.code),
        ));
        members.push(crate::value::Member::new(
            "faultString".to_owned(),
            Value::string(fault.string),
        ));

        Ok(FaultResponse {
            fault: FaultValue {
                value: Value::structure(crate::value::Struct::from_members(members)),
            },
        })
    }
}

impl TryFrom<FaultResponse> for Fault {
    type Error = DxrError;

    fn try_from(response: FaultResponse) -> Result<Fault, DxrError> {
        let members = response.fault.value.as_struct()?;

        let code = members
            .get("faultCode")
            .ok_or_else(|| DxrError::missing_field("Fault", "faultCode"))?
            .as_i4()?;

        let string = members
            .get("faultString")
            .ok_or_else(|| DxrError::missing_field("Fault", "faultString"))?
            .as_string()?
            .to_owned();

        Ok(Fault::new(code, string))
    }
}
