//! Error types for the embedded RPC client.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use embedded_rpc::{Result, EmbeddedClient};
//!
//! async fn example(client: &EmbeddedClient) -> Result<()> {
//!     let locale = client.user_settings_get_locale().await?;
//!     println!("{}", locale.locale);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`], [`Error::Schema`], [`Error::UnexpectedResponse`] |
//! | Remote | [`Error::Rpc`] |
//! | External | [`Error::Json`], [`Error::ChannelClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::protocol::RpcErrorCode;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when identity/session parameters are missing or invalid at
    /// construction time.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Message channel failure.
    ///
    /// Returned when the underlying message port rejects an outbound frame.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection torn down.
    ///
    /// Returned for commands still pending when the transport is closed, and
    /// for sends attempted after teardown.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation.
    ///
    /// Returned for unknown opcodes and other contract violations from the
    /// host side of the channel.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Payload failed schema validation.
    ///
    /// Returned when inbound data does not match the declared shape for its
    /// command or event.
    #[error("Schema validation failed for {context}: {message}")]
    Schema {
        /// What was being validated (command or event name).
        context: String,
        /// Description of the mismatch.
        message: String,
    },

    /// Response carried data for a different command.
    ///
    /// Returned when a correlated response parses cleanly but against the
    /// wrong command's shape.
    #[error("Unexpected response payload for command {command}")]
    UnexpectedResponse {
        /// The command that was sent.
        command: String,
    },

    // ========================================================================
    // Remote-Reported Errors
    // ========================================================================
    /// Typed fault reported by the host.
    ///
    /// Carries the numeric 4000-series code from the error frame.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Remote error code.
        code: RpcErrorCode,
        /// Remote error message (may be empty).
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a schema validation error.
    #[inline]
    pub fn schema(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates an unexpected-response error.
    #[inline]
    pub fn unexpected_response(command: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            command: command.into(),
        }
    }

    /// Creates a remote RPC fault.
    #[inline]
    pub fn rpc(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::ChannelClosed(_)
        )
    }

    /// Returns the remote error code, if this is a remote fault.
    #[inline]
    #[must_use]
    pub fn rpc_code(&self) -> Option<RpcErrorCode> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns `true` if the host rejected the payload shape.
    ///
    /// This is the single recoverable remote fault: commands that declare a
    /// legacy transform retry exactly once on it.
    #[inline]
    #[must_use]
    pub fn is_invalid_payload(&self) -> bool {
        self.rpc_code() == Some(RpcErrorCode::InvalidPayload)
    }

    /// Returns `true` if the host does not know the subscribed event.
    #[inline]
    #[must_use]
    pub fn is_invalid_event(&self) -> bool {
        self.rpc_code() == Some(RpcErrorCode::InvalidEvent)
    }
}

// ============================================================================
// Tests
// ============================================================================
