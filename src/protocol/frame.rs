//! Wire framing: opcodes and control payloads.
//!
//! Every message on the channel is a two-element JSON array
//! `[opcode, payload]`. Only [`Opcode::Frame`] carries command and event
//! traffic; the rest are connection control.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::Platform;
use crate::error::{Error, Result};

// ============================================================================
// Opcode
// ============================================================================

/// Message opcode, the first element of every wire frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Client identification, sent once on construction.
    Handshake,
    /// Command/event traffic.
    Frame,
    /// Terminal close.
    Close,
    /// Reserved greeting from the host.
    Hello,
}

impl Opcode {
    /// Converts a wire integer to an opcode.
    ///
    /// Returns `None` for integers outside the protocol's opcode set.
    #[inline]
    #[must_use]
    pub const fn from_u64(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Handshake),
            1 => Some(Self::Frame),
            2 => Some(Self::Close),
            3 => Some(Self::Hello),
            _ => None,
        }
    }

    /// Returns the wire integer for this opcode.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Handshake => 0,
            Self::Frame => 1,
            Self::Close => 2,
            Self::Hello => 3,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Handshake => "HANDSHAKE",
            Self::Frame => "FRAME",
            Self::Close => "CLOSE",
            Self::Hello => "HELLO",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Frame
// ============================================================================

/// An outbound wire unit: `(opcode, payload)`.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame opcode.
    pub opcode: Opcode,
    /// Opcode-specific payload.
    pub payload: Value,
}

impl Frame {
    /// Creates a frame.
    #[inline]
    #[must_use]
    pub fn new(opcode: Opcode, payload: Value) -> Self {
        Self { opcode, payload }
    }

    /// Serializes the frame to its two-element array wire form.
    #[inline]
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!([self.opcode.as_u8(), self.payload])
    }
}

// ============================================================================
// RawFrame
// ============================================================================

/// An inbound wire unit before opcode validation.
///
/// Classification is two-staged so the transport can discard malformed
/// envelopes silently but treat unknown opcodes as protocol faults.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Wire opcode integer, not yet validated.
    pub opcode: u64,
    /// Opcode-specific payload.
    pub payload: Value,
}

impl RawFrame {
    /// Extracts `(opcode, payload)` from an inbound message value.
    ///
    /// Returns `None` if the value is not a two-element array with an integer
    /// first element; such messages are dropped without error.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        if items.len() != 2 {
            return None;
        }
        let opcode = items[0].as_u64()?;
        Some(Self {
            opcode,
            payload: items[1].clone(),
        })
    }

    /// Validates the opcode against the protocol's opcode set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for an opcode outside the set; that is a
    /// contract violation, not a droppable message.
    pub fn opcode(&self) -> Result<Opcode> {
        Opcode::from_u64(self.opcode).ok_or_else(|| Error::protocol("invalid message format"))
    }
}

// ============================================================================
// HandshakePayload
// ============================================================================

/// Payload of the HANDSHAKE frame sent on construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// Protocol version; always 1.
    pub v: u8,
    /// Payload encoding; always "json".
    pub encoding: String,
    /// Application client id.
    pub client_id: String,
    /// Hosting frame id from the query string.
    pub frame_id: String,
}

impl HandshakePayload {
    /// Creates a v1 JSON handshake for the given identity.
    #[inline]
    #[must_use]
    pub fn new(client_id: impl Into<String>, frame_id: impl Into<String>) -> Self {
        Self {
            v: 1,
            encoding: "json".to_string(),
            client_id: client_id.into(),
            frame_id: frame_id.into(),
        }
    }
}

// ============================================================================
// HelloPayload
// ============================================================================

/// Payload of the reserved HELLO frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Hosting frame id.
    pub frame_id: String,
    /// Host platform, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

// ============================================================================
// CloseCode
// ============================================================================

/// Close codes carried on CLOSE frames.
///
/// The 1000-series mirrors standard socket closure; the 4000-series is
/// protocol-specific. Codes outside the known set are preserved as
/// [`CloseCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum CloseCode {
    /// Normal closure.
    CloseNormal,
    /// Unsupported payload.
    CloseUnsupported,
    /// Abnormal closure.
    CloseAbnormal,
    /// Client id not recognized.
    InvalidClientId,
    /// Sender origin not allowed.
    InvalidOrigin,
    /// Too many frames.
    RateLimited,
    /// Auth token revoked.
    TokenRevoked,
    /// Unsupported protocol version.
    InvalidVersion,
    /// Unsupported encoding.
    InvalidEncoding,
    /// Unrecognized close code.
    Other(u16),
}

impl From<u16> for CloseCode {
    fn from(value: u16) -> Self {
        match value {
            1000 => Self::CloseNormal,
            1003 => Self::CloseUnsupported,
            1006 => Self::CloseAbnormal,
            4000 => Self::InvalidClientId,
            4001 => Self::InvalidOrigin,
            4002 => Self::RateLimited,
            4003 => Self::TokenRevoked,
            4004 => Self::InvalidVersion,
            4005 => Self::InvalidEncoding,
            other => Self::Other(other),
        }
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        match code {
            CloseCode::CloseNormal => 1000,
            CloseCode::CloseUnsupported => 1003,
            CloseCode::CloseAbnormal => 1006,
            CloseCode::InvalidClientId => 4000,
            CloseCode::InvalidOrigin => 4001,
            CloseCode::RateLimited => 4002,
            CloseCode::TokenRevoked => 4003,
            CloseCode::InvalidVersion => 4004,
            CloseCode::InvalidEncoding => 4005,
            CloseCode::Other(other) => other,
        }
    }
}

// ============================================================================
// ClosePayload
// ============================================================================

/// Payload of a CLOSE frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosePayload {
    /// Close code.
    pub code: CloseCode,
    /// Optional human-readable reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ClosePayload {
    /// Parses a CLOSE payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when the payload does not match the close
    /// shape. CLOSE is a terminal control event, so this propagates instead
    /// of being dropped.
    pub fn parse(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| Error::schema("CLOSE", e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_round_trip() {
        for code in [Opcode::Handshake, Opcode::Frame, Opcode::Close, Opcode::Hello] {
            assert_eq!(Opcode::from_u64(u64::from(code.as_u8())), Some(code));
        }
        assert_eq!(Opcode::from_u64(4), None);
    }

    #[test]
    fn test_frame_wire_form() {
        let frame = Frame::new(Opcode::Frame, json!({"cmd": "DISPATCH"}));
        let value = frame.to_value();
        assert_eq!(value[0], json!(1));
        assert_eq!(value[1]["cmd"], json!("DISPATCH"));
    }

    #[test]
    fn test_raw_frame_rejects_malformed_envelopes() {
        assert!(RawFrame::from_value(&json!({"cmd": "x"})).is_none());
        assert!(RawFrame::from_value(&json!([1])).is_none());
        assert!(RawFrame::from_value(&json!([1, {}, {}])).is_none());
        assert!(RawFrame::from_value(&json!(["FRAME", {}])).is_none());
    }

    #[test]
    fn test_raw_frame_unknown_opcode_is_protocol_fault() {
        let raw = RawFrame::from_value(&json!([9, {}])).expect("well-formed envelope");
        let err = raw.opcode().expect_err("opcode 9 is not in the set");
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_handshake_payload_shape() {
        let payload = HandshakePayload::new("client-1", "frame-1");
        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(value["v"], json!(1));
        assert_eq!(value["encoding"], json!("json"));
        assert_eq!(value["client_id"], json!("client-1"));
        assert_eq!(value["frame_id"], json!("frame-1"));
    }

    #[test]
    fn test_close_code_coercion() {
        assert_eq!(CloseCode::from(4001), CloseCode::InvalidOrigin);
        assert_eq!(CloseCode::from(1000), CloseCode::CloseNormal);
        assert_eq!(CloseCode::from(4999), CloseCode::Other(4999));
        assert_eq!(u16::from(CloseCode::TokenRevoked), 4003);
    }

    #[test]
    fn test_close_payload_parse() {
        let payload =
            ClosePayload::parse(&json!({"code": 4002, "message": "slow down"})).expect("parse");
        assert_eq!(payload.code, CloseCode::RateLimited);
        assert_eq!(payload.message.as_deref(), Some("slow down"));

        let err = ClosePayload::parse(&json!({"message": "missing code"}));
        assert!(err.is_err());
    }
}
