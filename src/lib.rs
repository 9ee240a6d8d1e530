//! Embedded RPC - Typed client for sandboxed embedded apps.
//!
//! This library speaks the message-port RPC protocol between an app embedded
//! in a sandboxed frame and its hosting client: commands out, correlated
//! responses and pushed events back in.
//!
//! # Architecture
//!
//! The client follows a frame-correlation model:
//!
//! - **App side (this crate)**: Sends `[opcode, payload]` frames, correlates
//!   responses by nonce, dispatches validated events to listeners
//! - **Host side**: Executes commands, pushes subscribed events
//!
//! Key design principles:
//!
//! - Every inbound payload is schema-validated before any caller sees it
//! - Unknown commands and events fail fast; unknown enum *values* coerce to
//!   an explicit `Unhandled` sentinel instead
//! - Remote subscriptions are reference-counted: only the 0→1 and 1→0
//!   listener transitions cross the wire
//! - The transport is a capability ([`PortChannel`]): the embedding
//!   application supplies the message port, the client never owns a socket
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use embedded_rpc::{EmbeddedClient, EventName, Identity, PortChannel, Result};
//!
//! async fn run(port: PortChannel) -> Result<()> {
//!     // Session identity arrives on the embedding page's query string
//!     let identity =
//!         Identity::from_query("frame_id=f-1&instance_id=i-1&platform=desktop")?;
//!     let client = EmbeddedClient::new("my-client-id", identity, port)?;
//!
//!     // Handshake is sent on construction; READY resolves readiness
//!     client.ready().await?;
//!
//!     // Typed commands
//!     let locale = client.user_settings_get_locale().await?;
//!     println!("locale: {}", locale.locale);
//!
//!     // Ref-counted event subscriptions
//!     client
//!         .subscribe(
//!             EventName::SpeakingStart,
//!             Arc::new(|event| println!("{event:?}")),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`EmbeddedClient`]: state machine, inbound loop, subscriptions |
//! | [`commands`] | Typed command surface, one async method per operation |
//! | [`compat`] | Layout-mode / PIP-mode compatibility adapter |
//! | [`config`] | [`Identity`], [`Platform`], [`SdkConfig`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`flags`] | Wide permission-flag helpers |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`mock`] | [`MockClient`]: canned responses, no transport |
//! | [`network`] | Network capability + URL route remapping |
//! | [`protocol`] | Frame envelope, opcodes, close/error codes (internal) |
//! | [`schema`] | Command, event, and response shapes |
//! | [`subscription`] | Ref-counted listener registry (internal) |
//! | [`transport`] | Message-port capability and origin gating |

// ============================================================================
// Modules
// ============================================================================

/// Connection core: state machine, handshake, inbound loop, subscriptions,
/// console capture.
pub mod client;

/// Typed command surface.
///
/// One async method per remote operation, each narrowing the validated
/// response to its declared shape.
pub mod commands;

/// Layout-mode / PIP-mode compatibility adapter for hosts that predate the
/// modern layout event.
pub mod compat;

/// Client configuration and query-string identity resolution.
pub mod config;

/// Nonce-to-caller correlation table.
///
/// Internal module pairing outbound frames with their responses.
pub mod correlation;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Permission-flag helpers over wide integer bit sets.
pub mod flags;

/// Type-safe identifiers for frames and listeners.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Transport-free stand-in client with canned responses.
pub mod mock;

/// Outbound network capability with `{placeholder}` URL route remapping.
pub mod network;

/// Frame envelope, opcodes, and close/error codes.
///
/// Internal module defining the wire layer beneath the schema registry.
pub mod protocol;

/// Command, event, and response shapes plus their validation gates.
pub mod schema;

/// Reference-counted listener registry.
///
/// Internal module backing [`EmbeddedClient`] subscriptions.
pub mod subscription;

/// Message-port capability and inbound origin gating.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{ConnectionState, ConsoleLevel, ConsoleSink, EmbeddedClient};

// Command argument types
pub use commands::{ActivityInput, AuthorizeArgs, OrientationLockArgs, UserVoiceSettingsArgs};

// Compat types
pub use compat::{LayoutModeListener, LayoutModeSubscription};

// Configuration types
pub use config::{Identity, Platform, SdkConfig};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ListenerId, Nonce};

// Mock client
pub use mock::MockClient;

// Network types
pub use network::{NetworkEnvironment, RemappedNetwork, RouteMapping};

// Protocol types
pub use protocol::{CloseCode, ErrorData, Opcode, RpcErrorCode};

// Schema types
pub use schema::{Command, EventData, EventName, ResponseData};

// Subscription callback types
pub use subscription::{ErrorListener, EventListener};

// Transport types
pub use transport::{InboundMessage, MessageSink, OriginPolicy, PortChannel, TRUSTED_ORIGINS};
