//! Layout-mode compatibility adapter.
//!
//! Older hosts only push the legacy PIP-mode event; newer hosts push the
//! richer layout-mode event. The adapter subscribes to both and presents a
//! single layout-mode stream:
//!
//! - PIP updates are translated (`is_pip_mode` → PIP/FOCUSED).
//! - The first genuine layout-mode update retires the PIP bridge, so a host
//!   that speaks both never double-delivers.
//! - A host that rejects the layout-mode subscription with invalid-event
//!   leaves the PIP bridge as the effective subscription.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::warn;

use crate::client::EmbeddedClient;
use crate::error::Result;
use crate::identifiers::ListenerId;
use crate::protocol::OutgoingFrame;
use crate::schema::common::{Command, LayoutMode};
use crate::schema::events::ActivityLayoutModeUpdateData;
use crate::schema::{EventData, EventName};
use crate::subscription::EventListener;

// ============================================================================
// Types
// ============================================================================

/// Callback receiving unified layout-mode updates.
pub type LayoutModeListener = Arc<dyn Fn(&ActivityLayoutModeUpdateData) + Send + Sync>;

/// The PIP half of a compat subscription, retired at most once.
struct PipBridge {
    listener_id: ListenerId,
    retired: AtomicBool,
}

/// Handle for tearing down a compat subscription.
pub struct LayoutModeSubscription {
    layout_id: ListenerId,
    pip: Arc<PipBridge>,
}

// ============================================================================
// Compat Surface
// ============================================================================

impl EmbeddedClient {
    /// Subscribes to layout-mode updates with legacy-host compatibility.
    ///
    /// # Errors
    ///
    /// Propagates subscription faults other than the layout-mode
    /// invalid-event rejection, which downgrades to PIP-only delivery.
    pub async fn subscribe_to_layout_mode_updates_compat(
        &self,
        listener: LayoutModeListener,
    ) -> Result<LayoutModeSubscription> {
        // Legacy bridge: translate PIP flips into layout modes.
        let pip_listener: EventListener = {
            let listener = Arc::clone(&listener);
            Arc::new(move |event| {
                if let EventData::ActivityPipModeUpdate(update) = event {
                    let layout_mode = if update.is_pip_mode {
                        LayoutMode::Pip
                    } else {
                        LayoutMode::Focused
                    };
                    listener(&ActivityLayoutModeUpdateData { layout_mode });
                }
            })
        };
        let pip_id = self
            .subscribe(EventName::ActivityPipModeUpdate, pip_listener)
            .await?;
        let pip = Arc::new(PipBridge {
            listener_id: pip_id,
            retired: AtomicBool::new(false),
        });

        // Modern listener: the first real update retires the bridge.
        let layout_listener: EventListener = {
            let listener = Arc::clone(&listener);
            let pip = Arc::clone(&pip);
            let inner = Arc::downgrade(&self.inner);
            Arc::new(move |event| {
                let EventData::ActivityLayoutModeUpdate(update) = event else {
                    return;
                };
                if !pip.retired.swap(true, Ordering::SeqCst)
                    && let Some(inner) = inner.upgrade()
                {
                    let id = pip.listener_id;
                    tokio::spawn(async move {
                        let client = EmbeddedClient { inner };
                        if let Err(e) = client
                            .unsubscribe(EventName::ActivityPipModeUpdate, id)
                            .await
                        {
                            warn!(error = %e, "failed to retire PIP bridge");
                        }
                    });
                }
                listener(update);
            })
        };

        // Registered by hand so the listener id survives a rejected remote
        // subscription.
        let registration = self
            .inner
            .registry
            .add(EventName::ActivityLayoutModeUpdate, layout_listener);
        if registration.first_for_event {
            let frame = OutgoingFrame::new(Command::Subscribe, Value::Null)
                .with_event(EventName::ActivityLayoutModeUpdate);
            match self.inner.send_command(frame).await {
                Ok(_) => {}
                Err(e) if e.is_invalid_event() => {
                    warn!("host does not know layout-mode updates, PIP bridge stays active");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(LayoutModeSubscription {
            layout_id: registration.id,
            pip,
        })
    }

    /// Tears down a compat subscription.
    ///
    /// Tolerates the invalid-event rejection on the layout-mode path (the
    /// listener is still removed locally); any PIP bridge not yet retired is
    /// unsubscribed normally.
    ///
    /// # Errors
    ///
    /// Propagates any other unsubscribe fault.
    pub async fn unsubscribe_from_layout_mode_updates_compat(
        &self,
        subscription: LayoutModeSubscription,
    ) -> Result<()> {
        match self
            .unsubscribe(EventName::ActivityLayoutModeUpdate, subscription.layout_id)
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_invalid_event() => {
                self.inner
                    .registry
                    .remove(EventName::ActivityLayoutModeUpdate, subscription.layout_id);
            }
            Err(e) => return Err(e),
        }

        if !subscription.pip.retired.swap(true, Ordering::SeqCst) {
            self.unsubscribe(EventName::ActivityPipModeUpdate, subscription.pip.listener_id)
                .await?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
