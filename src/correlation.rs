//! Request/response correlation.
//!
//! Every outbound command registers its nonce here before it hits the wire;
//! the inbound loop resolves or rejects the matching entry when the echo
//! arrives. A nonce completes at most once, and an unknown nonce (late or
//! duplicate delivery) is a silent no-op.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::Nonce;
use crate::schema::ResponseFrame;

// ============================================================================
// Types
// ============================================================================

/// Map of in-flight nonces to completion channels.
type PendingMap = FxHashMap<Nonce, oneshot::Sender<Result<ResponseFrame>>>;

// ============================================================================
// CorrelationTable
// ============================================================================

/// Nonce-keyed table of in-flight commands.
///
/// # Thread Safety
///
/// All operations take a short internal lock; no lock is held across await
/// points or listener callbacks.
#[derive(Default)]
pub struct CorrelationTable {
    pending: Mutex<PendingMap>,
}

impl CorrelationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a nonce and returns the receiver its completion arrives on.
    ///
    /// The entry must be registered before the request is sent, so a response
    /// racing the registration cannot be dropped.
    pub fn register(&self, nonce: Nonce) -> oneshot::Receiver<Result<ResponseFrame>> {
        let (tx, rx) = oneshot::channel();
        let previous = self.pending.lock().insert(nonce, tx);
        debug_assert!(previous.is_none(), "nonce collision");
        trace!(%nonce, "registered pending command");
        rx
    }

    /// Completes the entry for `nonce`, removing it.
    ///
    /// Returns `false` when no entry exists; the caller logs and drops such
    /// frames.
    pub fn complete(&self, nonce: Nonce, result: Result<ResponseFrame>) -> bool {
        let Some(tx) = self.pending.lock().remove(&nonce) else {
            debug!(%nonce, "no pending command for nonce, dropping");
            return false;
        };
        // The caller may have dropped its receiver; nothing left to do then.
        let _ = tx.send(result);
        true
    }

    /// Rejects every pending entry with a connection-closed fault.
    ///
    /// Called on teardown so no caller is left awaiting forever.
    pub fn fail_all(&self) {
        let pending = std::mem::take(&mut *self.pending.lock());
        if !pending.is_empty() {
            debug!(count = pending.len(), "rejecting pending commands on teardown");
        }
        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }
    }

    /// Number of in-flight commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether no commands are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::common::Command;
    use crate::schema::responses::{AuthorizeData, ResponseData};

    fn response(nonce: Nonce) -> ResponseFrame {
        ResponseFrame {
            cmd: Command::Authorize,
            data: ResponseData::Authorize(AuthorizeData {
                code: "abc".to_string(),
            }),
            nonce: Some(nonce),
        }
    }

    #[tokio::test]
    async fn test_register_and_complete() {
        let table = CorrelationTable::new();
        let nonce = Nonce::generate();
        let rx = table.register(nonce);
        assert_eq!(table.len(), 1);

        assert!(table.complete(nonce, Ok(response(nonce))));
        assert!(table.is_empty());

        let frame = rx.await.expect("channel open").expect("resolved");
        assert_eq!(frame.cmd, Command::Authorize);
    }

    #[test]
    fn test_pending_until_completed() {
        let table = CorrelationTable::new();
        let nonce = Nonce::generate();
        let mut rx = tokio_test::task::spawn(table.register(nonce));

        tokio_test::assert_pending!(rx.poll());
        table.complete(nonce, Ok(response(nonce)));
        let completion = tokio_test::assert_ready!(rx.poll()).expect("channel open");
        assert_eq!(completion.expect("resolved").nonce, Some(nonce));
    }

    #[tokio::test]
    async fn test_unknown_nonce_is_noop() {
        let table = CorrelationTable::new();
        assert!(!table.complete(Nonce::generate(), Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_completion_is_once_only() {
        let table = CorrelationTable::new();
        let nonce = Nonce::generate();
        let _rx = table.register(nonce);

        assert!(table.complete(nonce, Ok(response(nonce))));
        // Duplicate delivery of the same nonce.
        assert!(!table.complete(nonce, Ok(response(nonce))));
    }

    #[tokio::test]
    async fn test_out_of_order_completion() {
        let table = CorrelationTable::new();
        let first = Nonce::generate();
        let second = Nonce::generate();
        let rx_first = table.register(first);
        let rx_second = table.register(second);

        table.complete(second, Ok(response(second)));
        table.complete(first, Ok(response(first)));

        assert_eq!(
            rx_second.await.expect("open").expect("ok").nonce,
            Some(second)
        );
        assert_eq!(rx_first.await.expect("open").expect("ok").nonce, Some(first));
    }

    #[tokio::test]
    async fn test_fail_all_rejects_everything() {
        let table = CorrelationTable::new();
        let rx_a = table.register(Nonce::generate());
        let rx_b = table.register(Nonce::generate());

        table.fail_all();
        assert!(table.is_empty());

        for rx in [rx_a, rx_b] {
            let err = rx.await.expect("channel open").expect_err("rejected");
            assert!(matches!(err, Error::ConnectionClosed));
        }
    }
}
