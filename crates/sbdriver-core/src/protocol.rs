// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method-channel wire protocol.
//
// Calls and replies travel as JSON envelopes, the same shape the UI
// runtime's JSON method codec produces:
//
//   call            {"method": "getApiUrl", "args": null}
//   success         [<result>]
//   error           ["<code>", "<message>", <details>]
//   not implemented (empty payload)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SbDriverError};

/// Channel both the native host and the UI runtime must agree on. A
/// mismatch is not detected by either side: calls simply go unanswered.
pub const CONFIG_CHANNEL: &str = "com.speedbook.taxidriver/config";

/// Error code reported by metadata-bundle backends (Android, desktop).
pub const META_DATA_ERROR: &str = "META_DATA_ERROR";

/// Error code reported by the iOS Info.plist backend.
pub const PLIST_ERROR: &str = "PLIST_ERROR";

/// Error code for a call envelope that could not be decoded.
pub const MALFORMED_CALL: &str = "MALFORMED_CALL";

/// One inbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

impl MethodCall {
    /// A call with no arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Value::Null,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| SbDriverError::MalformedEnvelope(e.to_string()))
    }
}

/// Outcome of one call.
///
/// `NotImplemented` is a protocol mismatch (the native side does not know
/// the method) and is deliberately not an `Error`: callers must be able to
/// tell "unsupported" from "supported but misconfigured".
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    /// `message` is `None` when the envelope carries `null`, which the UI
    /// runtime's codec allows.
    Error {
        code: String,
        message: Option<String>,
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: Some(message.into()),
            details: None,
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }

    /// Encode into a reply envelope. `NotImplemented` is the empty payload.
    pub fn encode_envelope(&self) -> Result<Vec<u8>> {
        let envelope = match self {
            Self::Success(value) => Value::Array(vec![value.clone()]),
            Self::Error {
                code,
                message,
                details,
            } => Value::Array(vec![
                Value::String(code.clone()),
                message.clone().map_or(Value::Null, Value::String),
                details.clone().unwrap_or(Value::Null),
            ]),
            Self::NotImplemented => return Ok(Vec::new()),
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Decode a reply envelope produced by [`encode_envelope`](Self::encode_envelope).
    pub fn decode_envelope(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::NotImplemented);
        }

        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| SbDriverError::MalformedEnvelope(e.to_string()))?;
        let Value::Array(mut items) = value else {
            return Err(SbDriverError::MalformedEnvelope(
                "reply envelope is not a JSON array".into(),
            ));
        };

        match items.len() {
            1 => Ok(Self::Success(items.remove(0))),
            3 => {
                let details = match items.pop() {
                    Some(Value::Null) | None => None,
                    Some(other) => Some(other),
                };
                let message = match items.pop() {
                    Some(Value::String(message)) => Some(message),
                    Some(Value::Null) | None => None,
                    Some(other) => {
                        return Err(SbDriverError::MalformedEnvelope(format!(
                            "error message must be a string or null, got {other}"
                        )));
                    }
                };
                match items.pop() {
                    Some(Value::String(code)) => Ok(Self::Error {
                        code,
                        message,
                        details,
                    }),
                    _ => Err(SbDriverError::MalformedEnvelope(
                        "error envelope has no string code".into(),
                    )),
                }
            }
            n => Err(SbDriverError::MalformedEnvelope(format!(
                "reply envelope has {n} elements, expected 1 or 3"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_without_args_decodes() {
        let call = MethodCall::decode(br#"{"method":"getApiUrl"}"#).unwrap();
        assert_eq!(call, MethodCall::new("getApiUrl"));
    }

    #[test]
    fn garbage_call_is_malformed() {
        let err = MethodCall::decode(b"getApiUrl").unwrap_err();
        assert!(matches!(err, SbDriverError::MalformedEnvelope(_)));
    }

    #[test]
    fn success_envelope_shape() {
        let bytes = MethodResponse::success("AIzaXYZ").encode_envelope().unwrap();
        assert_eq!(bytes, br#"["AIzaXYZ"]"#);
    }

    #[test]
    fn error_envelope_shape() {
        let resp = MethodResponse::error(META_DATA_ERROR, "API_URL not found");
        let bytes = resp.encode_envelope().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!(["META_DATA_ERROR", "API_URL not found", null]));
        assert_eq!(MethodResponse::decode_envelope(&bytes).unwrap(), resp);
    }

    #[test]
    fn not_implemented_is_empty_payload() {
        assert!(MethodResponse::NotImplemented.encode_envelope().unwrap().is_empty());
        assert!(MethodResponse::decode_envelope(b"").unwrap().is_not_implemented());
    }

    #[test]
    fn null_success_is_not_conflated_with_not_implemented() {
        let resp = MethodResponse::decode_envelope(b"[null]").unwrap();
        assert_eq!(resp, MethodResponse::Success(Value::Null));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(MethodResponse::decode_envelope(b"[1, 2]").is_err());
        assert!(MethodResponse::decode_envelope(br#"{"a":1}"#).is_err());
        assert!(MethodResponse::decode_envelope(b"[1, \"m\", null]").is_err());
    }

    #[test]
    fn null_error_message_stays_absent() {
        let resp = MethodResponse::decode_envelope(br#"["PLIST_ERROR", null, null]"#).unwrap();
        assert_eq!(
            resp,
            MethodResponse::Error {
                code: "PLIST_ERROR".into(),
                message: None,
                details: None,
            }
        );
        assert_eq!(resp.encode_envelope().unwrap(), br#"["PLIST_ERROR",null,null]"#);
    }

    #[test]
    fn non_string_error_message_is_rejected() {
        let err = MethodResponse::decode_envelope(br#"["META_DATA_ERROR", 42, null]"#).unwrap_err();
        assert!(matches!(err, SbDriverError::MalformedEnvelope(ref m) if m.contains("got 42")));
    }
}
