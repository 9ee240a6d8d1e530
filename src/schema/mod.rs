//! Payload schema registry and dispatch classification.
//!
//! Inbound FRAME payloads pass through two validation stages: the generic
//! shape (see [`crate::protocol::IncomingFrame`]) and then a per-command or
//! per-event shape from this registry. [`parse_incoming_payload`] performs
//! the second stage and classifies the frame for routing.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `common` | Command names, shared shapes, open enumerations |
//! | `events` | Pushed-event names and payload shapes |
//! | `responses` | Per-command response shapes |

// ============================================================================
// Submodules
// ============================================================================

/// Command names, shared shapes, and open enumerations.
pub mod common;

/// Pushed-event names and payload shapes.
pub mod events;

/// Per-command response shapes.
pub mod responses;

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};
use crate::identifiers::Nonce;
use crate::protocol::{ErrorData, IncomingFrame};

pub use common::Command;
pub use events::{ERROR_EVENT, EventData, EventName, parse_event_payload};
pub use responses::{ResponseData, ResponseFrame, parse_response_data};

// ============================================================================
// ParsedFrame
// ============================================================================

/// A fully validated inbound FRAME payload, classified for routing.
#[derive(Debug, Clone)]
pub enum ParsedFrame {
    /// A pushed event for the listener registry.
    Event(EventData),
    /// A remote error report. With a nonce it rejects the matching pending
    /// command; without one it goes to ERROR listeners.
    Error {
        nonce: Option<Nonce>,
        error: ErrorData,
    },
    /// A command response for the correlation map.
    Response(ResponseFrame),
}

// ============================================================================
// Classification
// ============================================================================

/// Classifies a generically valid frame and validates its payload.
///
/// # Errors
///
/// - [`Error::Protocol`] for an `evt` or `cmd` outside the known sets (a
///   contract violation, surfaced loudly).
/// - [`Error::Schema`] when the payload fails its declared shape. Event
///   frames are then dropped by the caller; response frames reject the
///   awaiting command instead.
pub fn parse_incoming_payload(frame: IncomingFrame) -> Result<ParsedFrame> {
    match frame.evt.as_deref() {
        Some(ERROR_EVENT) => {
            let error: ErrorData = serde_json::from_value(frame.data)
                .map_err(|e| Error::schema(ERROR_EVENT, e.to_string()))?;
            Ok(ParsedFrame::Error {
                nonce: frame.nonce,
                error,
            })
        }
        Some(evt) => {
            let name = EventName::parse(evt)
                .ok_or_else(|| Error::protocol(format!("Unrecognized event type {evt}")))?;
            let data = parse_event_payload(name, &frame.data)?;
            Ok(ParsedFrame::Event(data))
        }
        None => {
            let cmd = Command::parse(&frame.cmd)
                .ok_or_else(|| Error::protocol(format!("Unrecognized command {}", frame.cmd)))?;
            let data = parse_response_data(cmd, &frame.data)?;
            Ok(ParsedFrame::Response(ResponseFrame {
                cmd,
                data,
                nonce: frame.nonce,
            }))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn incoming(value: serde_json::Value) -> IncomingFrame {
        IncomingFrame::parse(&value).expect("generic shape")
    }

    #[test]
    fn test_classifies_event() {
        let parsed = parse_incoming_payload(incoming(json!({
            "cmd": "DISPATCH",
            "evt": "SPEAKING_START",
            "nonce": null,
            "data": {"user_id": "42"},
        })))
        .expect("classify");

        let ParsedFrame::Event(EventData::SpeakingStart(data)) = parsed else {
            panic!("expected SPEAKING_START event");
        };
        assert_eq!(data.user_id, "42");
    }

    #[test]
    fn test_classifies_response() {
        let nonce = Nonce::generate();
        let parsed = parse_incoming_payload(incoming(json!({
            "cmd": "AUTHORIZE",
            "evt": null,
            "nonce": nonce.to_string(),
            "data": {"code": "xyz"},
        })))
        .expect("classify");

        let ParsedFrame::Response(frame) = parsed else {
            panic!("expected response");
        };
        assert_eq!(frame.cmd, Command::Authorize);
        assert_eq!(frame.nonce, Some(nonce));
    }

    #[test]
    fn test_classifies_error_with_nonce() {
        let nonce = Nonce::generate();
        let parsed = parse_incoming_payload(incoming(json!({
            "cmd": "SET_ACTIVITY",
            "evt": "ERROR",
            "nonce": nonce.to_string(),
            "data": {"code": 4000, "message": "bad args"},
        })))
        .expect("classify");

        let ParsedFrame::Error { nonce: got, error } = parsed else {
            panic!("expected error frame");
        };
        assert_eq!(got, Some(nonce));
        assert!(error.into_error().is_invalid_payload());
    }

    #[test]
    fn test_unknown_event_fails_fast() {
        let err = parse_incoming_payload(incoming(json!({
            "cmd": "DISPATCH",
            "evt": "TELEPORT_COMPLETE",
            "data": {},
        })))
        .expect_err("unknown event");
        assert!(matches!(err, Error::Protocol { .. }));
        assert!(err.to_string().contains("TELEPORT_COMPLETE"));
    }

    #[test]
    fn test_unknown_command_fails_fast() {
        let err = parse_incoming_payload(incoming(json!({
            "cmd": "FROBNICATE",
            "evt": null,
            "data": {},
        })))
        .expect_err("unknown command");
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_event_shape_mismatch_is_schema_error() {
        let err = parse_incoming_payload(incoming(json!({
            "cmd": "DISPATCH",
            "evt": "SPEAKING_START",
            "data": {"user": {}},
        })))
        .expect_err("bad payload");
        assert!(matches!(err, Error::Schema { .. }));
    }
}
