//! Top-level event routing.
//!
//! One [`App`] instance owns every flow and all shared state. Each decoded
//! [`Inbound`] event passes through the same gauntlet: banned-user
//! short-circuit, activity refresh, then admin or user routing. Precedence
//! for admin text mirrors the funnel's contract: a pending admin flow
//! consumes the event before menu labels are interpreted, so an admin can
//! broadcast a message that happens to look like a button label.

use std::sync::Arc;

use log::{debug, error};

use crate::admin::AdminPanel;
use crate::broadcast::BroadcastEngine;
use crate::config::BotConfig;
use crate::content;
use crate::event::{Event, Inbound};
use crate::gateway::Gateway;
use crate::ledger::BroadcastLedger;
use crate::onboarding::OnboardingFlow;
use crate::registry::Registry;
use crate::session::{AdminSessionStore, SessionStore};

pub struct App<G> {
    gateway: Arc<G>,
    registry: Arc<Registry>,
    sessions: SessionStore,
    admin_sessions: AdminSessionStore,
    onboarding: OnboardingFlow<G>,
    admin: AdminPanel<G>,
}

impl<G: Gateway + 'static> App<G> {
    pub fn new(
        gateway: Arc<G>,
        registry: Arc<Registry>,
        ledger: Arc<BroadcastLedger>,
        config: &BotConfig,
    ) -> Self {
        let sessions = SessionStore::new();
        let admin_sessions = AdminSessionStore::new();
        let onboarding = OnboardingFlow::new(
            gateway.clone(),
            registry.clone(),
            sessions.clone(),
            config.channels.clone(),
        );
        let engine = BroadcastEngine::new(
            gateway.clone(),
            registry.clone(),
            ledger,
            admin_sessions.clone(),
        );
        let admin = AdminPanel::new(
            gateway.clone(),
            registry.clone(),
            admin_sessions.clone(),
            engine,
            config.admin_ids.clone(),
        );
        Self {
            gateway,
            registry,
            sessions,
            admin_sessions,
            onboarding,
            admin,
        }
    }

    /// Funnel sessions, exposed for state assertions in integration tests.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Admin sessions, exposed for state assertions in integration tests.
    pub fn admin_sessions(&self) -> &AdminSessionStore {
        &self.admin_sessions
    }

    /// Handle one decoded inbound event end to end.
    pub async fn handle(&self, inbound: Inbound) {
        let sender = &inbound.sender;
        let chat_id = inbound.chat_id;

        // Banned users are rejected before anything else; their activity is
        // not refreshed and no flow is entered.
        if self.registry.is_banned(sender.id) {
            match &inbound.event {
                Event::Callback { message, .. } => {
                    if let Err(e) = self
                        .gateway
                        .edit_text(*message, content::BANNED_NOTICE, None)
                        .await
                    {
                        debug!("Failed to notify banned user {}: {e}", sender.id);
                    }
                }
                _ => {
                    if let Err(e) = self
                        .gateway
                        .send_text(chat_id, content::BANNED_NOTICE, None)
                        .await
                    {
                        debug!("Failed to notify banned user {}: {e}", sender.id);
                    }
                }
            }
            return;
        }

        // Every surviving event refreshes activity; the entry command does
        // it through the upsert instead.
        if !matches!(inbound.event, Event::Start) {
            if let Err(e) = self.registry.touch_activity(sender.id) {
                error!("Failed to refresh activity for {}: {e}", sender.id);
            }
        }

        match &inbound.event {
            Event::Start => self.onboarding.handle_start(sender, chat_id).await,
            Event::AdminPanel => {
                if self.admin.is_admin(sender.id) {
                    self.admin.open_panel(chat_id).await;
                } else if let Err(e) = self
                    .gateway
                    .send_text(chat_id, content::NO_ADMIN_PERMISSION, None)
                    .await
                {
                    debug!("Failed to reject non-admin {}: {e}", sender.id);
                }
            }
            Event::Callback { action, message } => {
                self.onboarding
                    .handle_callback(sender, chat_id, *message, *action)
                    .await;
            }
            _ => self.route_message(&inbound).await,
        }
    }

    /// Text and media routing, after commands and callbacks are out of the
    /// way.
    async fn route_message(&self, inbound: &Inbound) {
        let sender = &inbound.sender;
        let chat_id = inbound.chat_id;

        if self.admin.is_admin(sender.id) {
            // A pending admin flow consumes the event first, whatever it
            // looks like.
            if let Some(flow) = self.admin_sessions.flow(sender.id) {
                self.admin
                    .handle_pending(sender, chat_id, flow, &inbound.event)
                    .await;
                return;
            }
            match &inbound.event {
                Event::AdminMenu(item) => self.admin.handle_menu(sender, chat_id, *item).await,
                Event::Menu(item) => self.onboarding.handle_menu(sender, chat_id, *item).await,
                Event::BackToMenu => self.onboarding.handle_back_to_menu(sender, chat_id).await,
                // Idle admins get no generic nag for unrecognized text.
                _ => {}
            }
            return;
        }

        match &inbound.event {
            Event::Menu(item) => self.onboarding.handle_menu(sender, chat_id, *item).await,
            Event::BackToMenu => self.onboarding.handle_back_to_menu(sender, chat_id).await,
            // Admin labels, cancel, free text and media from a regular user
            // all get the same generic nudge.
            _ => self.onboarding.handle_fallback(sender, chat_id).await,
        }
    }
}
