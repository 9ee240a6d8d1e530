//! Message transport: injected port capability and origin gate.
//!
//! The protocol core never touches an ambient messaging global. Outbound
//! frames go through an injected [`MessageSink`]; inbound messages arrive on
//! a channel the embedder feeds, each tagged with its sender origin. Origins
//! outside the allow-list are discarded before any payload inspection.

// ============================================================================
// Imports
// ============================================================================

use std::collections::HashSet;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::error::Result;
use crate::protocol::{Frame, Opcode, TransferList};

// ============================================================================
// Constants
// ============================================================================

/// Origins the host process is trusted to message from.
///
/// The literal `"null"` entry covers opaque-origin sandboxed frames.
pub const TRUSTED_ORIGINS: &[&str] = &[
    "https://discord.com",
    "https://discordapp.com",
    "https://ptb.discord.com",
    "https://ptb.discordapp.com",
    "https://canary.discord.com",
    "https://canary.discordapp.com",
    "https://staging.discord.co",
    "http://localhost:3333",
    "https://pax.discord.com",
    "null",
];

// ============================================================================
// InboundMessage
// ============================================================================

/// A raw inbound message, tagged with its sender origin.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Sender origin as reported by the messaging layer.
    pub origin: String,
    /// Unparsed message value.
    pub data: Value,
}

// ============================================================================
// MessageSink
// ============================================================================

/// Outbound half of the messaging port.
///
/// Implementations post a serialized wire frame toward the host. Posting is
/// fire-and-forget: a returned error means the port itself is unusable, not
/// that the host rejected anything.
pub trait MessageSink: Send + Sync + 'static {
    /// Posts a wire frame, optionally with transferable resources.
    fn post(&self, message: Value, transfer: Option<TransferList>) -> Result<()>;
}

/// A messaging port: outbound sink plus the inbound message stream.
pub struct PortChannel {
    /// Outbound sink.
    pub sink: Box<dyn MessageSink>,
    /// Inbound messages in delivery order.
    pub inbound: mpsc::UnboundedReceiver<InboundMessage>,
}

// ============================================================================
// OriginPolicy
// ============================================================================

/// The fixed origin allow-list.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: HashSet<String>,
}

impl OriginPolicy {
    /// Builds the policy from the trusted set plus the embedder's own
    /// origin, when it has one.
    #[must_use]
    pub fn new(own_origin: Option<&str>) -> Self {
        let mut allowed: HashSet<String> =
            TRUSTED_ORIGINS.iter().map(ToString::to_string).collect();
        if let Some(origin) = own_origin {
            allowed.insert(origin.to_string());
        }
        Self { allowed }
    }

    /// Whether messages from `origin` may be processed.
    #[must_use]
    pub fn allows(&self, origin: &str) -> bool {
        self.allowed.contains(origin)
    }
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self::new(None)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Outbound send path: origin policy + sink.
pub struct Transport {
    sink: Box<dyn MessageSink>,
    policy: OriginPolicy,
}

impl Transport {
    /// Creates a transport over the given sink.
    #[must_use]
    pub fn new(sink: Box<dyn MessageSink>, policy: OriginPolicy) -> Self {
        Self { sink, policy }
    }

    /// Whether an inbound message from `origin` passes the gate.
    ///
    /// Rejections are logged at warn; the message never reaches parsing.
    #[must_use]
    pub fn accepts(&self, origin: &str) -> bool {
        let ok = self.policy.allows(origin);
        if !ok {
            warn!(%origin, "discarding message from disallowed origin");
        }
        ok
    }

    /// Sends `[opcode, payload]`, fire-and-forget.
    pub fn send(&self, opcode: Opcode, payload: Value) -> Result<()> {
        self.send_with_transfer(opcode, payload, None)
    }

    /// Sends `[opcode, payload]` with optional transferable resources.
    pub fn send_with_transfer(
        &self,
        opcode: Opcode,
        payload: Value,
        transfer: Option<TransferList>,
    ) -> Result<()> {
        let frame = Frame::new(opcode, payload);
        trace!(opcode = %frame.opcode, "posting frame");
        self.sink.post(frame.to_value(), transfer)
    }
}

// ============================================================================
// Tests
// ============================================================================
