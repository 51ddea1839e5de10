//! Operator surface: admin panel, broadcast intake, ban/unban flows.

use std::sync::Arc;

use log::{debug, error, warn};

use crate::broadcast::BroadcastEngine;
use crate::content;
use crate::event::{AdminMenuItem, Event, Sender};
use crate::gateway::{Gateway, Keyboard};
use crate::registry::Registry;
use crate::session::{AdminFlow, AdminSessionStore};

pub struct AdminPanel<G> {
    gateway: Arc<G>,
    registry: Arc<Registry>,
    admin_sessions: AdminSessionStore,
    engine: BroadcastEngine<G>,
    admin_ids: Vec<i64>,
}

impl<G: Gateway + 'static> AdminPanel<G> {
    pub fn new(
        gateway: Arc<G>,
        registry: Arc<Registry>,
        admin_sessions: AdminSessionStore,
        engine: BroadcastEngine<G>,
        admin_ids: Vec<i64>,
    ) -> Self {
        Self {
            gateway,
            registry,
            admin_sessions,
            engine,
            admin_ids,
        }
    }

    /// Authorization is a static allow-list of operator identities.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// `/admin` entry: quick stats plus the six-item menu.
    pub async fn open_panel(&self, chat_id: i64) {
        let stats = self.registry.analytics();
        if let Err(e) = self
            .gateway
            .send_text(
                chat_id,
                &content::admin_panel_text(&stats),
                Some(content::admin_keyboard()),
            )
            .await
        {
            error!("Failed to present admin panel in chat {chat_id}: {e}");
        }
    }

    /// One of the six fixed panel actions, from an idle admin.
    pub async fn handle_menu(&self, admin: &Sender, chat_id: i64, item: AdminMenuItem) {
        match item {
            AdminMenuItem::Broadcast => {
                self.admin_sessions
                    .set(admin.id, AdminFlow::AwaitingBroadcast);
                self.send_notice(
                    chat_id,
                    &content::broadcast_prompt_text(),
                    Some(content::cancel_broadcast_keyboard()),
                )
                .await;
            }
            AdminMenuItem::TotalUsers => {
                let count = self.registry.count_active();
                self.send_notice(chat_id, &content::total_users_text(count), None)
                    .await;
            }
            AdminMenuItem::UserAnalysis => {
                let stats = self.registry.analytics();
                self.send_notice(chat_id, &content::user_analysis_text(&stats), None)
                    .await;
            }
            AdminMenuItem::BanUser => {
                self.admin_sessions
                    .set(admin.id, AdminFlow::AwaitingBanTarget);
                self.send_notice(
                    chat_id,
                    &content::ban_prompt_text(),
                    Some(content::cancel_keyboard()),
                )
                .await;
            }
            AdminMenuItem::UnbanUser => {
                self.admin_sessions
                    .set(admin.id, AdminFlow::AwaitingUnbanTarget);
                self.send_notice(
                    chat_id,
                    &content::unban_prompt_text(),
                    Some(content::cancel_keyboard()),
                )
                .await;
            }
            AdminMenuItem::Exit => {
                self.admin_sessions.clear(admin.id);
                self.send_notice(chat_id, content::EXITED_ADMIN, Some(Keyboard::Remove))
                    .await;
            }
        }
    }

    /// Resolve an event arriving while this admin has a pending flow.
    pub async fn handle_pending(
        &self,
        admin: &Sender,
        chat_id: i64,
        flow: AdminFlow,
        event: &Event,
    ) {
        match flow {
            AdminFlow::AwaitingBroadcast => {
                if matches!(event, Event::Cancel) {
                    self.admin_sessions.clear(admin.id);
                    self.send_notice(
                        chat_id,
                        content::BROADCAST_CANCELLED,
                        Some(Keyboard::Remove),
                    )
                    .await;
                    return;
                }
                match event.as_payload() {
                    Some(payload) => {
                        // Fire-and-forget: the fanout owns the session until
                        // it completes.
                        self.engine.spawn(admin.id, chat_id, payload);
                    }
                    None => {
                        debug!("Ignoring non-payload event while awaiting broadcast content");
                    }
                }
            }
            AdminFlow::Broadcasting => {
                self.send_notice(chat_id, content::BROADCAST_IN_PROGRESS, None)
                    .await;
            }
            AdminFlow::AwaitingBanTarget | AdminFlow::AwaitingUnbanTarget => {
                if matches!(event, Event::Cancel) {
                    self.admin_sessions.clear(admin.id);
                    self.send_notice(
                        chat_id,
                        content::OPERATION_CANCELLED,
                        Some(Keyboard::Remove),
                    )
                    .await;
                    return;
                }
                let ban = flow == AdminFlow::AwaitingBanTarget;
                self.resolve_target(admin, chat_id, event, ban).await;
            }
        }
    }

    /// Parse and act on a ban/unban target id.
    ///
    /// A value that does not parse as an integer is a validation error: the
    /// admin is told to retry and the flow stays pending. A definitive
    /// attempt (found or not) clears the flow.
    async fn resolve_target(&self, admin: &Sender, chat_id: i64, event: &Event, ban: bool) {
        let target: i64 = match event.as_text().and_then(|t| t.trim().parse().ok()) {
            Some(id) => id,
            None => {
                self.send_notice(chat_id, content::INVALID_USER_ID, None).await;
                return;
            }
        };

        match self.registry.set_banned(target, ban) {
            Ok(true) => {
                // Best-effort heads-up to the affected user.
                let notice = if ban {
                    content::USER_BANNED_NOTICE
                } else {
                    content::USER_UNBANNED_NOTICE
                };
                if let Err(e) = self.gateway.send_text(target, notice, None).await {
                    debug!("Failed to notify user {target}: {e}");
                }
                let confirmation = if ban {
                    content::ban_confirmed_text(target)
                } else {
                    content::unban_confirmed_text(target)
                };
                self.send_notice(chat_id, &confirmation, Some(Keyboard::Remove))
                    .await;
            }
            Ok(false) => {
                self.send_notice(
                    chat_id,
                    &content::user_not_found_text(target),
                    Some(Keyboard::Remove),
                )
                .await;
            }
            Err(e) => {
                error!("Failed to update ban state for {target}: {e}");
                self.send_notice(
                    chat_id,
                    &content::user_not_found_text(target),
                    Some(Keyboard::Remove),
                )
                .await;
            }
        }

        self.admin_sessions.clear(admin.id);
    }

    async fn send_notice(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) {
        if let Err(e) = self.gateway.send_text(chat_id, text, keyboard).await {
            warn!("Failed to send admin notice to chat {chat_id}: {e}");
        }
    }
}
