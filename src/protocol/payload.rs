//! Command traffic payload shapes.
//!
//! FRAME-opcode payloads come in three flavors:
//!
//! - **Outbound request**: `{cmd, args, nonce, transfer?}` (plus `evt` for
//!   subscribe/unsubscribe)
//! - **Response**: `{cmd, data, evt: null, nonce}`
//! - **Event**: `{evt, data, cmd: "DISPATCH", nonce: null}`
//!
//! The generic [`IncomingFrame`] shape is validated before any per-command or
//! per-event schema is applied.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::Nonce;
use crate::schema::common::Command;
use crate::schema::events::EventName;

// ============================================================================
// TransferList
// ============================================================================

/// Transferable resources attached to an outbound request.
///
/// Opaque to the protocol core; never attached to subscribe/unsubscribe.
pub type TransferList = Vec<Value>;

// ============================================================================
// OutgoingFrame
// ============================================================================

/// An outbound command request.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingFrame {
    /// Command name.
    pub cmd: Command,

    /// Command arguments.
    pub args: Value,

    /// Fresh correlation nonce.
    pub nonce: Nonce,

    /// Event name, present only on subscribe/unsubscribe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evt: Option<EventName>,

    /// Transferable resources, when the command carries any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<TransferList>,
}

impl OutgoingFrame {
    /// Creates a request with a freshly generated nonce.
    #[inline]
    #[must_use]
    pub fn new(cmd: Command, args: Value) -> Self {
        Self {
            cmd,
            args,
            nonce: Nonce::generate(),
            evt: None,
            transfer: None,
        }
    }

    /// Attaches the event name (subscribe/unsubscribe traffic).
    #[inline]
    #[must_use]
    pub fn with_event(mut self, evt: EventName) -> Self {
        self.evt = Some(evt);
        self
    }

    /// Attaches transferable resources.
    ///
    /// Subscribe and unsubscribe never carry transfer; the attachment is
    /// dropped for those commands.
    #[inline]
    #[must_use]
    pub fn with_transfer(mut self, transfer: Option<TransferList>) -> Self {
        self.transfer = match self.cmd {
            Command::Subscribe | Command::Unsubscribe => None,
            _ => transfer,
        };
        self
    }
}

// ============================================================================
// IncomingFrame
// ============================================================================

/// The generic shape every inbound FRAME payload must satisfy.
///
/// `evt` non-null classifies the frame as a pushed event; `evt` null
/// classifies it as a command response.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingFrame {
    /// Command name (or "DISPATCH" for events).
    pub cmd: String,

    /// Correlation nonce; null on pushed events.
    #[serde(default)]
    pub nonce: Option<Nonce>,

    /// Event name; null on responses.
    #[serde(default)]
    pub evt: Option<String>,

    /// Untyped payload, validated per command/event downstream.
    #[serde(default)]
    pub data: Value,
}

impl IncomingFrame {
    /// Parses the generic incoming shape.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Schema`] when the value is not an object with
    /// a string `cmd`. Callers on the dispatch path log and drop this.
    pub fn parse(value: &Value) -> crate::Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| crate::Error::schema("incoming frame", e.to_string()))
    }
}

// ============================================================================
// RpcErrorCode
// ============================================================================

/// Remote error codes carried on ERROR event frames.
///
/// The known set is 4000-series; anything else is preserved as
/// [`RpcErrorCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum RpcErrorCode {
    /// Arguments did not match the command's declared shape.
    ///
    /// The single recoverable code: commands with a legacy transform resend
    /// once with legacy-shaped args.
    InvalidPayload,
    /// Command not recognized by the host.
    InvalidCommand,
    /// Event not recognized by the host.
    InvalidEvent,
    /// Caller lacks permission for the operation.
    InvalidPermissions,
    /// Unrecognized error code.
    Other(u16),
}

impl From<u16> for RpcErrorCode {
    fn from(value: u16) -> Self {
        match value {
            4000 => Self::InvalidPayload,
            4002 => Self::InvalidCommand,
            4004 => Self::InvalidEvent,
            4006 => Self::InvalidPermissions,
            other => Self::Other(other),
        }
    }
}

impl From<RpcErrorCode> for u16 {
    fn from(code: RpcErrorCode) -> Self {
        match code {
            RpcErrorCode::InvalidPayload => 4000,
            RpcErrorCode::InvalidCommand => 4002,
            RpcErrorCode::InvalidEvent => 4004,
            RpcErrorCode::InvalidPermissions => 4006,
            RpcErrorCode::Other(other) => other,
        }
    }
}

impl fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u16::from(*self))
    }
}

// ============================================================================
// ErrorData
// ============================================================================

/// Payload of an ERROR event frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorData {
    /// Numeric error code.
    pub code: RpcErrorCode,

    /// Optional message.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorData {
    /// Converts the remote report into a crate error.
    #[inline]
    #[must_use]
    pub fn into_error(self) -> crate::Error {
        crate::Error::rpc(self.code, self.message.unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outgoing_frame_shape() {
        let frame = OutgoingFrame::new(Command::Authorize, json!({"client_id": "abc"}));
        let value = serde_json::to_value(&frame).expect("serialize");

        assert_eq!(value["cmd"], json!("AUTHORIZE"));
        assert_eq!(value["args"]["client_id"], json!("abc"));
        assert!(value["nonce"].is_string());
        assert!(value.get("transfer").is_none());
        assert!(value.get("evt").is_none());
    }

    #[test]
    fn test_subscribe_strips_transfer() {
        let frame = OutgoingFrame::new(Command::Subscribe, Value::Null)
            .with_event(EventName::SpeakingStart)
            .with_transfer(Some(vec![json!({"buffer": 1})]));
        assert!(frame.transfer.is_none());
        assert_eq!(frame.evt, Some(EventName::SpeakingStart));

        let frame = OutgoingFrame::new(Command::SetActivity, Value::Null)
            .with_transfer(Some(vec![json!({"buffer": 1})]));
        assert!(frame.transfer.is_some());
    }

    #[test]
    fn test_incoming_frame_parse() {
        let nonce = Nonce::generate();
        let frame = IncomingFrame::parse(&json!({
            "cmd": "AUTHORIZE",
            "nonce": nonce.to_string(),
            "evt": null,
            "data": {"code": "abc"},
        }))
        .expect("parse");

        assert_eq!(frame.cmd, "AUTHORIZE");
        assert_eq!(frame.nonce, Some(nonce));
        assert!(frame.evt.is_none());
    }

    #[test]
    fn test_incoming_frame_requires_cmd() {
        let err = IncomingFrame::parse(&json!({"evt": "READY"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_rpc_error_code_coercion() {
        assert_eq!(RpcErrorCode::from(4000), RpcErrorCode::InvalidPayload);
        assert_eq!(RpcErrorCode::from(4006), RpcErrorCode::InvalidPermissions);
        assert_eq!(RpcErrorCode::from(5000), RpcErrorCode::Other(5000));
        assert_eq!(RpcErrorCode::InvalidEvent.to_string(), "4004");
    }

    #[test]
    fn test_error_data_into_error() {
        let data: ErrorData =
            serde_json::from_value(json!({"code": 4002, "message": "unknown command"}))
                .expect("deserialize");
        let err = data.into_error();
        assert_eq!(err.rpc_code(), Some(RpcErrorCode::InvalidCommand));
    }
}
