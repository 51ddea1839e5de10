//! Broadcast fanout engine.
//!
//! Sends one payload to every active (non-banned) user, sequentially, with a
//! fixed pacing delay between sends. The run is spawned as an independent
//! task so the event loop keeps servicing other actors; the owning admin's
//! session is marked [`AdminFlow::Broadcasting`] for the duration and cleared
//! on completion. Per-target send failures are counted, never abort the run.
//! Progress is reported by editing a single message in place; edit failures
//! are swallowed (best-effort UI only).

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use tokio::task::JoinHandle;

use crate::content;
use crate::gateway::{Gateway, Payload};
use crate::ledger::BroadcastLedger;
use crate::registry::Registry;
use crate::session::{AdminFlow, AdminSessionStore};

/// Progress message is refreshed after every 50th send and on the last one.
pub const PROGRESS_EVERY: usize = 50;
/// Pacing delay between sends, to stay clear of gateway rate limits.
pub const SEND_DELAY: Duration = Duration::from_millis(100);

/// Counts of one completed fanout run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BroadcastOutcome {
    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            self.successful as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }
}

pub struct BroadcastEngine<G> {
    gateway: Arc<G>,
    registry: Arc<Registry>,
    ledger: Arc<BroadcastLedger>,
    admin_sessions: AdminSessionStore,
}

impl<G> Clone for BroadcastEngine<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            registry: self.registry.clone(),
            ledger: self.ledger.clone(),
            admin_sessions: self.admin_sessions.clone(),
        }
    }
}

impl<G: Gateway + 'static> BroadcastEngine<G> {
    pub fn new(
        gateway: Arc<G>,
        registry: Arc<Registry>,
        ledger: Arc<BroadcastLedger>,
        admin_sessions: AdminSessionStore,
    ) -> Self {
        Self {
            gateway,
            registry,
            ledger,
            admin_sessions,
        }
    }

    /// Accept a payload from `admin_id` and run the fanout in the
    /// background. There is no cooperative cancellation once the payload is
    /// accepted.
    pub fn spawn(&self, admin_id: i64, admin_chat_id: i64, payload: Payload) -> JoinHandle<BroadcastOutcome> {
        self.admin_sessions.set(admin_id, AdminFlow::Broadcasting);
        let engine = self.clone();
        tokio::spawn(async move { engine.run(admin_id, admin_chat_id, payload).await })
    }

    /// The fanout loop. Public for direct use in tests; production code goes
    /// through [`BroadcastEngine::spawn`].
    pub async fn run(&self, admin_id: i64, admin_chat_id: i64, payload: Payload) -> BroadcastOutcome {
        // Snapshot the target set once; banned users are excluded here but
        // stay in the registry.
        let targets = self.registry.list_active_ids();
        let mut outcome = BroadcastOutcome {
            total: targets.len(),
            ..BroadcastOutcome::default()
        };

        let progress = match self
            .gateway
            .send_text(
                admin_chat_id,
                &content::broadcast_progress_text(outcome.total, 0, 0, 0.0),
                None,
            )
            .await
        {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Failed to send broadcast progress message: {e}");
                None
            }
        };

        for (i, target) in targets.iter().enumerate() {
            match self.gateway.send(*target, &payload, None).await {
                Ok(_) => outcome.successful += 1,
                Err(e) => {
                    outcome.failed += 1;
                    warn!("Failed to send broadcast to {target}: {e}");
                }
            }

            let processed = i + 1;
            if processed % PROGRESS_EVERY == 0 || processed == outcome.total {
                let percent = processed as f64 / outcome.total as f64 * 100.0;
                if let Some(message) = progress {
                    if let Err(e) = self
                        .gateway
                        .edit_text(
                            message,
                            &content::broadcast_progress_text(
                                outcome.total,
                                outcome.successful,
                                outcome.failed,
                                percent,
                            ),
                            None,
                        )
                        .await
                    {
                        debug!("Failed to update broadcast progress: {e}");
                    }
                }
            }

            tokio::time::sleep(SEND_DELAY).await;
        }

        if let Err(e) = self
            .ledger
            .append(outcome.total, outcome.successful, outcome.failed)
        {
            error!("Failed to persist broadcast record: {e}");
        }

        if let Some(message) = progress {
            if let Err(e) = self
                .gateway
                .edit_text(
                    message,
                    &content::broadcast_summary_text(
                        outcome.total,
                        outcome.successful,
                        outcome.failed,
                        outcome.success_rate(),
                    ),
                    None,
                )
                .await
            {
                warn!("Failed to post broadcast summary: {e}");
            }
        }

        self.admin_sessions.clear(admin_id);

        // Back to the admin panel so the operator can keep working.
        let stats = self.registry.analytics();
        if let Err(e) = self
            .gateway
            .send_text(
                admin_chat_id,
                &content::admin_panel_text(&stats),
                Some(content::admin_keyboard()),
            )
            .await
        {
            warn!("Failed to re-present admin panel: {e}");
        }

        outcome
    }
}
