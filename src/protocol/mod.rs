//! Wire protocol message types.
//!
//! This module defines the framing and payload vocabulary spoken between the
//! embedded app (local end) and the host process (remote end).
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `HANDSHAKE` | Local → Remote | Identify client and frame |
//! | `FRAME` | Both | Command requests, responses, pushed events |
//! | `CLOSE` | Both | Terminal close with code + message |
//! | `HELLO` | Remote → Local | Reserved |
//!
//! Every unit on the wire is a two-element JSON array `[opcode, payload]`.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `frame` | Opcodes, wire framing, handshake/close/hello payloads |
//! | `payload` | Command traffic shapes and remote error codes |

// ============================================================================
// Submodules
// ============================================================================

/// Opcodes, wire framing, and control payloads.
pub mod frame;

/// Command traffic payload shapes.
pub mod payload;

// ============================================================================
// Re-exports
// ============================================================================

pub use frame::{CloseCode, ClosePayload, Frame, HandshakePayload, HelloPayload, Opcode, RawFrame};
pub use payload::{ErrorData, IncomingFrame, OutgoingFrame, RpcErrorCode, TransferList};
