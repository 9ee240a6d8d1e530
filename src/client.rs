//! Embedded RPC client.
//!
//! [`EmbeddedClient`] owns the connection state machine, the inbound
//! processing task, and the subscribe/unsubscribe surface. Typed command
//! methods live in [`crate::commands`]; the layout-mode compatibility
//! adapter in [`crate::compat`].
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized → HandshakeSent → Ready → Closed
//! ```
//!
//! The handshake is sent during construction. The host answers with a READY
//! event, a one-shot transition that resolves [`EmbeddedClient::ready`] and
//! arms console capture. `Closed` is terminal: teardown rejects every still
//! pending command and drops all listeners.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, trace, warn};

use crate::config::{Identity, Platform, SdkConfig};
use crate::correlation::CorrelationTable;
use crate::error::{Error, Result};
use crate::identifiers::{ListenerId, Nonce};
use crate::protocol::{
    ClosePayload, CloseCode, HandshakePayload, IncomingFrame, Opcode, OutgoingFrame, RawFrame,
};
use crate::schema::common::Command;
use crate::schema::{EventName, ParsedFrame, parse_incoming_payload};
use crate::subscription::{EventListener, SubscriptionRegistry};
use crate::transport::{InboundMessage, PortChannel, Transport};

// ============================================================================
// ConnectionState
// ============================================================================

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Constructed, handshake not yet sent.
    Uninitialized,
    /// Handshake posted, READY not yet received.
    HandshakeSent,
    /// READY received; full command surface available.
    Ready,
    /// Terminal. No inbound frame is processed after this.
    Closed,
}

// ============================================================================
// Console Capture
// ============================================================================

/// Log level accepted by the capture-log command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Log,
    Warn,
    Debug,
    Info,
    Error,
}

/// Handle that forwards log lines to the host once capture is armed.
///
/// Lines logged before READY (or with capture disabled) are dropped.
#[derive(Clone)]
pub struct ConsoleSink {
    tx: mpsc::UnboundedSender<(ConsoleLevel, String)>,
    armed: Arc<AtomicBool>,
}

impl ConsoleSink {
    /// Queues a log line for forwarding.
    pub fn log(&self, level: ConsoleLevel, message: impl Into<String>) {
        if !self.armed.load(Ordering::Acquire) {
            return;
        }
        let _ = self.tx.send((level, message.into()));
    }
}

// ============================================================================
// ClientInner
// ============================================================================

pub(crate) struct ClientInner {
    client_id: String,
    identity: Identity,
    config: SdkConfig,
    pub(crate) transport: Transport,
    pub(crate) correlation: CorrelationTable,
    pub(crate) registry: SubscriptionRegistry,
    state: watch::Sender<ConnectionState>,
    console_tx: mpsc::UnboundedSender<(ConsoleLevel, String)>,
    console_rx: Mutex<Option<mpsc::UnboundedReceiver<(ConsoleLevel, String)>>>,
    console_armed: Arc<AtomicBool>,
}

impl ClientInner {
    /// Sends a command frame and awaits its correlated response.
    ///
    /// The nonce is registered before the frame is posted so a fast response
    /// cannot race the registration.
    pub(crate) async fn send_command(
        &self,
        frame: OutgoingFrame,
    ) -> Result<crate::schema::ResponseFrame> {
        match *self.state.borrow() {
            ConnectionState::Uninitialized => {
                return Err(Error::connection(
                    "attempting to send a command before initialization",
                ));
            }
            ConnectionState::Closed => return Err(Error::ConnectionClosed),
            ConnectionState::HandshakeSent | ConnectionState::Ready => {}
        }

        let nonce = frame.nonce;
        let transfer = frame.transfer.clone();
        let payload = serde_json::to_value(&frame)?;

        let rx = self.correlation.register(nonce);
        trace!(cmd = %frame.cmd, %nonce, "sending command");
        if let Err(e) = self
            .transport
            .send_with_transfer(Opcode::Frame, payload, transfer)
        {
            self.correlation.complete(nonce, Err(Error::ConnectionClosed));
            return Err(e);
        }

        rx.await.map_err(Error::from)?
    }

    /// Processes one inbound message.
    ///
    /// # Errors
    ///
    /// Returns the protocol contract violations (unknown opcode, unknown
    /// `evt`/`cmd`, malformed CLOSE); the loop surfaces them at error level.
    /// Recoverable mismatches are logged and dropped here.
    fn handle_message(self: &Arc<Self>, message: InboundMessage) -> Result<()> {
        if !self.transport.accepts(&message.origin) {
            return Ok(());
        }
        let Some(raw) = RawFrame::from_value(&message.data) else {
            trace!("dropping non-frame message");
            return Ok(());
        };
        match raw.opcode()? {
            Opcode::Hello => Ok(()),
            // Reserved hook: the host never handshakes back today.
            Opcode::Handshake => Ok(()),
            Opcode::Close => {
                let close = ClosePayload::parse(&raw.payload)?;
                warn!(code = u16::from(close.code), message = ?close.message, "host sent CLOSE");
                Ok(())
            }
            Opcode::Frame => {
                self.handle_frame(&raw.payload);
                Ok(())
            }
        }
    }

    /// Routes one FRAME payload through validation to its destination.
    fn handle_frame(self: &Arc<Self>, payload: &Value) {
        let frame = match IncomingFrame::parse(payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "dropping frame with invalid generic shape");
                return;
            }
        };
        let nonce = frame.nonce;
        let is_response = frame.evt.is_none();

        match parse_incoming_payload(frame) {
            Ok(ParsedFrame::Event(event)) => {
                if event.name() == EventName::Ready {
                    self.handle_ready();
                }
                let notified = self.registry.dispatch(&event);
                trace!(event = %event.name(), notified, "event dispatched");
            }
            Ok(ParsedFrame::Error { nonce: Some(nonce), error }) => {
                // Targeted rejection, never broadcast.
                self.correlation.complete(nonce, Err(error.into_error()));
            }
            Ok(ParsedFrame::Error { nonce: None, error }) => {
                let notified = self.registry.dispatch_error(&error);
                debug!(code = %error.code, notified, "broadcast remote error");
            }
            Ok(ParsedFrame::Response(response)) => match response.nonce {
                Some(nonce) => {
                    self.correlation.complete(nonce, Ok(response));
                }
                None => warn!(cmd = %response.cmd, "dropping response without nonce"),
            },
            Err(e) => {
                let is_protocol = matches!(e, Error::Protocol { .. });
                let description = e.to_string();
                // A failed response validation still resolves the caller.
                let resolved = if is_response && let Some(nonce) = nonce {
                    self.correlation.complete(nonce, Err(e))
                } else {
                    false
                };
                if resolved {
                    return;
                }
                if is_protocol {
                    error!(error = %description, "protocol contract violation");
                } else {
                    warn!(error = %description, "dropping frame that failed validation");
                }
            }
        }
    }

    /// One-shot READY transition: arm console capture, wake `ready()`.
    fn handle_ready(self: &Arc<Self>) {
        let mut transitioned = false;
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::HandshakeSent {
                *state = ConnectionState::Ready;
                transitioned = true;
            }
            transitioned
        });
        if !transitioned {
            debug!("ignoring repeated READY");
            return;
        }
        debug!("connection ready");
        if !self.config.disable_console_log_override {
            self.arm_console_capture();
        }
    }

    /// Starts the capture-log forwarding task. Runs at most once.
    fn arm_console_capture(self: &Arc<Self>) {
        let Some(mut rx) = self.console_rx.lock().take() else {
            return;
        };
        self.console_armed.store(true, Ordering::Release);
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            while let Some((level, message)) = rx.recv().await {
                let frame = OutgoingFrame::new(
                    Command::CaptureLog,
                    json!({"level": level, "message": message}),
                );
                if let Err(e) = inner.send_command(frame).await {
                    debug!(error = %e, "capture-log forwarding failed");
                    if matches!(e, Error::ConnectionClosed) {
                        break;
                    }
                }
            }
        });
    }

    /// Terminal teardown. Idempotent.
    fn teardown(&self) {
        let previous = self.state.send_replace(ConnectionState::Closed);
        if previous == ConnectionState::Closed {
            return;
        }
        debug!("tearing down client");
        self.console_armed.store(false, Ordering::Release);
        self.correlation.fail_all();
        self.registry.clear();
    }
}

// ============================================================================
// Inbound Loop
// ============================================================================

async fn run_inbound_loop(
    inner: Arc<ClientInner>,
    mut inbound: mpsc::UnboundedReceiver<InboundMessage>,
) {
    while let Some(message) = inbound.recv().await {
        if *inner.state.borrow() == ConnectionState::Closed {
            break;
        }
        if let Err(e) = inner.handle_message(message) {
            error!(error = %e, "protocol fault on inbound message");
        }
    }
    debug!("inbound loop finished");
}

// ============================================================================
// EmbeddedClient
// ============================================================================

/// The embedded application's end of the host RPC channel.
///
/// # Thread Safety
///
/// `EmbeddedClient` is cheaply cloneable; clones share one connection.
#[derive(Clone)]
pub struct EmbeddedClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl EmbeddedClient {
    /// Connects with default configuration and origin policy.
    ///
    /// Sends the handshake immediately and spawns the inbound task, so this
    /// must run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when the port rejects the handshake frame.
    pub fn new(client_id: impl Into<String>, identity: Identity, port: PortChannel) -> Result<Self> {
        Self::with_config(
            client_id,
            identity,
            port,
            SdkConfig::default(),
            crate::transport::OriginPolicy::default(),
        )
    }

    /// Connects with explicit configuration and origin policy.
    ///
    /// # Errors
    ///
    /// Returns an error when the port rejects the handshake frame.
    pub fn with_config(
        client_id: impl Into<String>,
        identity: Identity,
        port: PortChannel,
        config: SdkConfig,
        policy: crate::transport::OriginPolicy,
    ) -> Result<Self> {
        let PortChannel { sink, inbound } = port;
        let (state, _) = watch::channel(ConnectionState::Uninitialized);
        let (console_tx, console_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(ClientInner {
            client_id: client_id.into(),
            identity,
            config,
            transport: Transport::new(sink, policy),
            correlation: CorrelationTable::new(),
            registry: SubscriptionRegistry::new(),
            state,
            console_tx,
            console_rx: Mutex::new(Some(console_rx)),
            console_armed: Arc::new(AtomicBool::new(false)),
        });

        let handshake =
            HandshakePayload::new(inner.client_id.clone(), inner.identity.frame_id.clone());
        inner
            .transport
            .send(Opcode::Handshake, serde_json::to_value(&handshake)?)?;
        inner.state.send_replace(ConnectionState::HandshakeSent);

        tokio::spawn(run_inbound_loop(Arc::clone(&inner), inbound));
        Ok(Self { inner })
    }

    /// Application client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// Resolved identity parameters.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.inner.identity
    }

    /// Host platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.inner.identity.platform
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Handle for forwarding log lines to the host.
    #[must_use]
    pub fn console_sink(&self) -> ConsoleSink {
        ConsoleSink {
            tx: self.inner.console_tx.clone(),
            armed: Arc::clone(&self.inner.console_armed),
        }
    }

    /// Resolves once the host has pushed READY.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the client closes first.
    pub async fn ready(&self) -> Result<()> {
        let mut rx = self.inner.state.subscribe();
        loop {
            match *rx.borrow_and_update() {
                ConnectionState::Ready => return Ok(()),
                ConnectionState::Closed => return Err(Error::ConnectionClosed),
                _ => {}
            }
            if rx.changed().await.is_err() {
                return Err(Error::ConnectionClosed);
            }
        }
    }

    /// Registers a listener for `evt`, subscribing remotely on the 0→1
    /// transition.
    ///
    /// The listener is registered before the remote exchange and stays
    /// registered even when the exchange fails, matching the local-first
    /// registration order events are delivered in.
    ///
    /// # Errors
    ///
    /// Propagates the SUBSCRIBE rejection (e.g. an invalid-event fault).
    pub async fn subscribe(&self, evt: EventName, listener: EventListener) -> Result<ListenerId> {
        self.subscribe_with_args(evt, listener, Value::Null).await
    }

    /// [`subscribe`](Self::subscribe) with host-interpreted subscription
    /// arguments.
    pub async fn subscribe_with_args(
        &self,
        evt: EventName,
        listener: EventListener,
        args: Value,
    ) -> Result<ListenerId> {
        let registration = self.inner.registry.add(evt, listener);
        if evt.is_remote_subscribable() && registration.first_for_event {
            let frame = OutgoingFrame::new(Command::Subscribe, args).with_event(evt);
            self.inner.send_command(frame).await?;
        }
        Ok(registration.id)
    }

    /// Removes a listener, unsubscribing remotely on the 1→0 transition.
    ///
    /// Unknown registrations are a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the UNSUBSCRIBE rejection; the listener is then left
    /// registered.
    pub async fn unsubscribe(&self, evt: EventName, id: ListenerId) -> Result<()> {
        if !self.inner.registry.contains(evt, id) {
            return Ok(());
        }
        if evt.is_remote_subscribable() && self.inner.registry.count(evt) == 1 {
            let frame = OutgoingFrame::new(Command::Unsubscribe, Value::Null).with_event(evt);
            self.inner.send_command(frame).await?;
        }
        self.inner.registry.remove(evt, id);
        Ok(())
    }

    /// Registers a listener on the broadcast error channel.
    pub fn on_error(&self, listener: crate::subscription::ErrorListener) -> ListenerId {
        self.inner.registry.add_error_listener(listener)
    }

    /// Removes a broadcast error listener.
    pub fn remove_error_listener(&self, id: ListenerId) -> bool {
        self.inner.registry.remove_error_listener(id)
    }

    /// Sends a CLOSE frame and tears the client down.
    ///
    /// Idempotent; every still-pending command is rejected with a
    /// connection-closed fault.
    pub fn close(&self, code: CloseCode, message: &str) {
        if self.state() == ConnectionState::Closed {
            return;
        }
        let payload = json!({
            "code": u16::from(code),
            "message": message,
            "nonce": Nonce::generate(),
        });
        if let Err(e) = self.inner.transport.send(Opcode::Close, payload) {
            warn!(error = %e, "failed to post CLOSE frame");
        }
        self.inner.teardown();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TransferList;
    use crate::schema::EventData;
    use crate::schema::events::SpeakingData;
    use crate::transport::MessageSink;
    use std::sync::atomic::AtomicUsize;
    use tokio::task::yield_now;

    struct RecordingSink {
        posted: Arc<Mutex<Vec<Value>>>,
    }

    impl MessageSink for RecordingSink {
        fn post(&self, message: Value, _transfer: Option<TransferList>) -> Result<()> {
            self.posted.lock().push(message);
            Ok(())
        }
    }

    struct Harness {
        client: EmbeddedClient,
        posted: Arc<Mutex<Vec<Value>>>,
        host_tx: mpsc::UnboundedSender<InboundMessage>,
    }

    fn identity() -> Identity {
        Identity::from_query("frame_id=f-1&instance_id=i-1&platform=desktop").expect("identity")
    }

    fn harness() -> Harness {
        // RUST_LOG=embedded_rpc=trace surfaces the frame flow when a test fails.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        let posted = Arc::new(Mutex::new(Vec::new()));
        let (host_tx, inbound) = mpsc::unbounded_channel();
        let port = PortChannel {
            sink: Box::new(RecordingSink {
                posted: Arc::clone(&posted),
            }),
            inbound,
        };
        let client = EmbeddedClient::new("client-1", identity(), port).expect("connect");
        Harness {
            client,
            posted,
            host_tx,
        }
    }

    impl Harness {
        fn push(&self, origin: &str, data: Value) {
            self.host_tx
                .send(InboundMessage {
                    origin: origin.to_string(),
                    data,
                })
                .expect("loop alive");
        }

        fn push_ready(&self) {
            self.push(
                "https://discord.com",
                json!([1, {
                    "cmd": "DISPATCH",
                    "evt": "READY",
                    "nonce": null,
                    "data": {
                        "v": 1,
                        "config": {"api_endpoint": "//api", "environment": "production"},
                    },
                }]),
            );
        }

        /// Nonce of the most recently posted FRAME payload.
        fn last_nonce(&self) -> String {
            let posted = self.posted.lock();
            let frame = posted.last().expect("a frame was posted");
            frame[1]["nonce"].as_str().expect("nonce").to_string()
        }
    }

    #[tokio::test]
    async fn test_handshake_sent_on_construction() {
        let h = harness();
        let posted = h.posted.lock();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0][0], json!(0));
        assert_eq!(posted[0][1]["v"], json!(1));
        assert_eq!(posted[0][1]["encoding"], json!("json"));
        assert_eq!(posted[0][1]["client_id"], json!("client-1"));
        assert_eq!(posted[0][1]["frame_id"], json!("f-1"));
        drop(posted);
        assert_eq!(h.client.state(), ConnectionState::HandshakeSent);
    }

    #[tokio::test]
    async fn test_ready_transition_and_wait() {
        let h = harness();
        h.push_ready();

        h.client.ready().await.expect("ready");
        assert_eq!(h.client.state(), ConnectionState::Ready);

        // Repeated READY is ignored.
        h.push_ready();
        yield_now().await;
        assert_eq!(h.client.state(), ConnectionState::Ready);
    }

    #[tokio::test]
    async fn test_disallowed_origin_is_discarded() {
        let h = harness();
        h.push(
            "https://evil.example.com",
            json!([1, {
                "cmd": "DISPATCH",
                "evt": "READY",
                "data": {"v": 1, "config": {"api_endpoint": "//a", "environment": "production"}},
            }]),
        );
        yield_now().await;
        assert_eq!(h.client.state(), ConnectionState::HandshakeSent);
    }

    #[tokio::test]
    async fn test_command_resolves_by_nonce() {
        let h = harness();
        let client = h.client.clone();

        let task = tokio::spawn(async move {
            client
                .inner
                .send_command(OutgoingFrame::new(Command::Authorize, json!({})))
                .await
        });
        yield_now().await;

        let nonce = h.last_nonce();
        h.push(
            "https://discord.com",
            json!([1, {
                "cmd": "AUTHORIZE",
                "evt": null,
                "nonce": nonce,
                "data": {"code": "the-code"},
            }]),
        );

        let frame = task.await.expect("join").expect("resolved");
        assert_eq!(frame.cmd, Command::Authorize);
    }

    #[tokio::test]
    async fn test_error_frame_rejects_matching_command() {
        let h = harness();
        let client = h.client.clone();

        let task = tokio::spawn(async move {
            client
                .inner
                .send_command(OutgoingFrame::new(Command::SetActivity, json!({})))
                .await
        });
        yield_now().await;

        let nonce = h.last_nonce();
        h.push(
            "https://discord.com",
            json!([1, {
                "cmd": "SET_ACTIVITY",
                "evt": "ERROR",
                "nonce": nonce,
                "data": {"code": 4006, "message": "denied"},
            }]),
        );

        let err = task.await.expect("join").expect_err("rejected");
        assert_eq!(
            err.rpc_code(),
            Some(crate::protocol::RpcErrorCode::InvalidPermissions)
        );
    }

    #[tokio::test]
    async fn test_nonceless_error_broadcasts() {
        let h = harness();
        let seen = Arc::new(AtomicUsize::new(0));
        {
            let seen = Arc::clone(&seen);
            h.client.on_error(Arc::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }));
        }

        h.push(
            "https://discord.com",
            json!([1, {
                "cmd": "DISPATCH",
                "evt": "ERROR",
                "nonce": null,
                "data": {"code": 5001, "message": "host hiccup"},
            }]),
        );
        yield_now().await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_response_shape_rejects_caller() {
        let h = harness();
        let client = h.client.clone();

        let task = tokio::spawn(async move {
            client
                .inner
                .send_command(OutgoingFrame::new(Command::Authorize, json!({})))
                .await
        });
        yield_now().await;

        let nonce = h.last_nonce();
        h.push(
            "https://discord.com",
            json!([1, {
                "cmd": "AUTHORIZE",
                "evt": null,
                "nonce": nonce,
                "data": {"wrong": true},
            }]),
        );

        let err = task.await.expect("join").expect_err("schema mismatch");
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[tokio::test]
    async fn test_subscribe_refcount_drives_wire_traffic() {
        let h = harness();
        let client = h.client.clone();

        // First subscription sends SUBSCRIBE.
        let task = tokio::spawn({
            let client = client.clone();
            async move {
                client
                    .subscribe(EventName::SpeakingStart, Arc::new(|_| {}))
                    .await
            }
        });
        yield_now().await;
        {
            let posted = h.posted.lock();
            let frame = posted.last().expect("subscribe frame");
            assert_eq!(frame[1]["cmd"], json!("SUBSCRIBE"));
            assert_eq!(frame[1]["evt"], json!("SPEAKING_START"));
        }
        let nonce = h.last_nonce();
        h.push(
            "https://discord.com",
            json!([1, {"cmd": "SUBSCRIBE", "evt": null, "nonce": nonce,
                       "data": {"evt": "SPEAKING_START"}}]),
        );
        let first = task.await.expect("join").expect("subscribed");

        // Second subscription is local only.
        let frames_before = h.posted.lock().len();
        let second = client
            .subscribe(EventName::SpeakingStart, Arc::new(|_| {}))
            .await
            .expect("local subscribe");
        assert_eq!(h.posted.lock().len(), frames_before);

        // Removing the non-last listener is local only.
        client.unsubscribe(EventName::SpeakingStart, second).await.expect("local");
        assert_eq!(h.posted.lock().len(), frames_before);

        // Removing the last listener sends UNSUBSCRIBE.
        let task = tokio::spawn({
            let client = client.clone();
            async move { client.unsubscribe(EventName::SpeakingStart, first).await }
        });
        yield_now().await;
        {
            let posted = h.posted.lock();
            let frame = posted.last().expect("unsubscribe frame");
            assert_eq!(frame[1]["cmd"], json!("UNSUBSCRIBE"));
        }
        let nonce = h.last_nonce();
        h.push(
            "https://discord.com",
            json!([1, {"cmd": "UNSUBSCRIBE", "evt": null, "nonce": nonce,
                       "data": {"evt": "SPEAKING_START"}}]),
        );
        task.await.expect("join").expect("unsubscribed");
        assert_eq!(h.client.inner.registry.count(EventName::SpeakingStart), 0);
    }

    #[tokio::test]
    async fn test_ready_subscription_is_local_only() {
        let h = harness();
        let hits = Arc::new(AtomicUsize::new(0));
        let frames_before = h.posted.lock().len();
        {
            let hits = Arc::clone(&hits);
            h.client
                .subscribe(
                    EventName::Ready,
                    Arc::new(move |_| {
                        hits.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .await
                .expect("local subscribe");
        }
        // No SUBSCRIBE crossed the wire.
        assert_eq!(h.posted.lock().len(), frames_before);

        h.push_ready();
        h.client.ready().await.expect("ready");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_event_dispatch_to_listeners() {
        let h = harness();
        let heard = Arc::new(Mutex::new(Vec::new()));
        {
            let heard = Arc::clone(&heard);
            let task = tokio::spawn({
                let client = h.client.clone();
                async move {
                    client
                        .subscribe(
                            EventName::SpeakingStart,
                            Arc::new(move |event| {
                                if let EventData::SpeakingStart(SpeakingData { user_id }) = event {
                                    heard.lock().push(user_id.clone());
                                }
                            }),
                        )
                        .await
                }
            });
            yield_now().await;
            let nonce = h.last_nonce();
            h.push(
                "https://discord.com",
                json!([1, {"cmd": "SUBSCRIBE", "evt": null, "nonce": nonce,
                           "data": {"evt": "SPEAKING_START"}}]),
            );
            task.await.expect("join").expect("subscribed");
        }

        h.push(
            "https://discord.com",
            json!([1, {"cmd": "DISPATCH", "evt": "SPEAKING_START", "nonce": null,
                       "data": {"user_id": "u-77"}}]),
        );
        yield_now().await;
        assert_eq!(*heard.lock(), vec!["u-77".to_string()]);
    }

    #[tokio::test]
    async fn test_close_rejects_pending_and_is_terminal() {
        let h = harness();
        let client = h.client.clone();

        let task = tokio::spawn(async move {
            client
                .inner
                .send_command(OutgoingFrame::new(Command::Authorize, json!({})))
                .await
        });
        yield_now().await;

        h.client.close(CloseCode::CloseNormal, "goodbye");
        assert_eq!(h.client.state(), ConnectionState::Closed);

        // Pending command rejected.
        let err = task.await.expect("join").expect_err("rejected");
        assert!(matches!(err, Error::ConnectionClosed));

        // CLOSE frame went out.
        {
            let posted = h.posted.lock();
            let frame = posted.last().expect("close frame");
            assert_eq!(frame[0], json!(2));
            assert_eq!(frame[1]["code"], json!(1000));
            assert_eq!(frame[1]["message"], json!("goodbye"));
        }

        // Inbound frames after teardown are ignored.
        h.push_ready();
        yield_now().await;
        assert_eq!(h.client.state(), ConnectionState::Closed);

        // New commands fail immediately.
        let err = h
            .client
            .inner
            .send_command(OutgoingFrame::new(Command::Authorize, json!({})))
            .await
            .expect_err("closed");
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_console_sink_drops_before_ready_and_forwards_after() {
        let h = harness();
        let sink = h.client.console_sink();

        sink.log(ConsoleLevel::Info, "too early");
        yield_now().await;
        let frames_before = h.posted.lock().len();

        h.push_ready();
        h.client.ready().await.expect("ready");

        sink.log(ConsoleLevel::Error, "something broke");
        yield_now().await;

        let posted = h.posted.lock();
        assert_eq!(posted.len(), frames_before + 1);
        let frame = posted.last().expect("capture frame");
        assert_eq!(frame[1]["cmd"], json!("CAPTURE_LOG"));
        assert_eq!(frame[1]["args"]["level"], json!("error"));
        assert_eq!(frame[1]["args"]["message"], json!("something broke"));
    }

    #[tokio::test]
    async fn test_console_capture_disabled_by_config() {
        let posted = Arc::new(Mutex::new(Vec::new()));
        let (host_tx, inbound) = mpsc::unbounded_channel();
        let port = PortChannel {
            sink: Box::new(RecordingSink {
                posted: Arc::clone(&posted),
            }),
            inbound,
        };
        let client = EmbeddedClient::with_config(
            "client-1",
            identity(),
            port,
            SdkConfig {
                disable_console_log_override: true,
            },
            crate::transport::OriginPolicy::default(),
        )
        .expect("connect");

        host_tx
            .send(InboundMessage {
                origin: "https://discord.com".to_string(),
                data: json!([1, {
                    "cmd": "DISPATCH",
                    "evt": "READY",
                    "nonce": null,
                    "data": {"v": 1, "config": {"api_endpoint": "//a", "environment": "production"}},
                }]),
            })
            .expect("loop alive");
        client.ready().await.expect("ready");

        let frames_before = posted.lock().len();
        client.console_sink().log(ConsoleLevel::Warn, "never forwarded");
        yield_now().await;
        assert_eq!(posted.lock().len(), frames_before);
    }
}
