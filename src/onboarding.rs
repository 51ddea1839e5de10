//! Per-user onboarding state machine.
//!
//! Drives the admission funnel: channel check, terms agreement, main menu.
//! Transitions are driven by decoded [`Event`]s; the dispatcher has already
//! rejected banned users and refreshed activity before anything lands here.
//!
//! # Stages
//!
//! ```text
//! ChannelCheck -- ConfirmJoined + gate passes --> TermsAgreement
//! ChannelCheck -- ConfirmJoined + gate fails  --> ChannelCheck (re-prompt)
//! TermsAgreement -- AgreeTerms --> MainMenu
//! TermsAgreement -- DeclineTerms --> TermsAgreement (re-prompt)
//! MainMenu -- menu items / back --> MainMenu
//! ```
//!
//! Gateway failures on presentation and retraction are best-effort: logged,
//! never fatal to the flow.

use std::sync::Arc;

use log::{error, info, warn};

use crate::config::ChannelConfig;
use crate::content;
use crate::event::{CallbackAction, MenuItem, Sender};
use crate::gateway::{Gateway, MessageRef};
use crate::membership::MembershipGate;
use crate::registry::Registry;
use crate::session::{MessageTag, SessionStore, Stage};

pub struct OnboardingFlow<G> {
    gateway: Arc<G>,
    registry: Arc<Registry>,
    sessions: SessionStore,
    gate: MembershipGate<G>,
    channels: Vec<ChannelConfig>,
}

impl<G: Gateway> OnboardingFlow<G> {
    pub fn new(
        gateway: Arc<G>,
        registry: Arc<Registry>,
        sessions: SessionStore,
        channels: Vec<ChannelConfig>,
    ) -> Self {
        let gate = MembershipGate::new(gateway.clone(), channels.clone());
        Self {
            gateway,
            registry,
            sessions,
            gate,
            channels,
        }
    }

    /// Entry event: register the user, reset the session to the channel
    /// check and present the join prompt.
    pub async fn handle_start(&self, sender: &Sender, chat_id: i64) {
        if let Err(e) = self.registry.upsert(sender.id, &sender.profile()) {
            error!("Failed to persist user {}: {e}", sender.id);
        }
        self.sessions.begin(sender.id);

        match self
            .gateway
            .send_text(
                chat_id,
                &content::welcome_text(),
                Some(content::join_keyboard(&self.channels)),
            )
            .await
        {
            Ok(message) => self.sessions.remember(sender.id, MessageTag::Welcome, message),
            Err(e) => error!("Failed to send join prompt to user {}: {e}", sender.id),
        }
    }

    /// Button press dispatch. `origin` is the message carrying the button.
    pub async fn handle_callback(
        &self,
        sender: &Sender,
        chat_id: i64,
        origin: MessageRef,
        action: CallbackAction,
    ) {
        match action {
            CallbackAction::ConfirmJoined => self.confirm_joined(sender, chat_id, origin).await,
            CallbackAction::AgreeTerms => self.agree_terms(sender, chat_id, origin).await,
            CallbackAction::DeclineTerms => self.decline_terms(origin).await,
        }
    }

    async fn confirm_joined(&self, sender: &Sender, chat_id: i64, origin: MessageRef) {
        if self.gate.check_all(sender.id).await {
            self.sessions.set_stage(sender.id, Stage::TermsAgreement);
            if let Some(welcome) = self.sessions.take_message(sender.id, MessageTag::Welcome) {
                match self.gateway.delete(welcome).await {
                    Ok(()) => info!("Deleted join prompt for user {}", sender.id),
                    Err(e) => warn!("Failed to delete join prompt for user {}: {e}", sender.id),
                }
            }
            match self
                .gateway
                .send_text(chat_id, &content::terms_text(), Some(content::terms_keyboard()))
                .await
            {
                Ok(message) => self.sessions.remember(sender.id, MessageTag::Terms, message),
                Err(e) => error!("Failed to send terms prompt to user {}: {e}", sender.id),
            }
        } else {
            // Fail-closed: stay in ChannelCheck and re-present the join
            // prompt in place, with a failure notice.
            if let Err(e) = self
                .gateway
                .edit_text(
                    origin,
                    content::JOIN_FAILURE_TEXT,
                    Some(content::join_keyboard(&self.channels)),
                )
                .await
            {
                warn!("Failed to re-present join prompt to user {}: {e}", sender.id);
            }
        }
    }

    async fn agree_terms(&self, sender: &Sender, chat_id: i64, origin: MessageRef) {
        // Guard against stale/replayed button presses: only an exact
        // TermsAgreement session advances.
        if self.sessions.stage(sender.id) != Some(Stage::TermsAgreement) {
            if let Err(e) = self
                .gateway
                .edit_text(origin, content::COMPLETE_PREVIOUS_STEPS, None)
                .await
            {
                warn!("Failed to notify user {} of stale agree: {e}", sender.id);
            }
            return;
        }

        self.sessions.set_stage(sender.id, Stage::MainMenu);
        if let Some(terms) = self.sessions.take_message(sender.id, MessageTag::Terms) {
            match self.gateway.delete(terms).await {
                Ok(()) => info!("Deleted terms prompt for user {}", sender.id),
                Err(e) => warn!("Failed to delete terms prompt for user {}: {e}", sender.id),
            }
        }
        self.present_main_menu(chat_id).await;
    }

    async fn decline_terms(&self, origin: MessageRef) {
        // The funnel cannot be exited by disagreeing; re-present the prompt.
        if let Err(e) = self
            .gateway
            .edit_text(
                origin,
                content::TERMS_DECLINED_TEXT,
                Some(content::terms_keyboard()),
            )
            .await
        {
            warn!("Failed to re-present terms prompt: {e}");
        }
    }

    /// One of the five fixed menu options.
    pub async fn handle_menu(&self, sender: &Sender, chat_id: i64, item: MenuItem) {
        if self.sessions.stage(sender.id) == Some(Stage::MainMenu) {
            if let Err(e) = self
                .gateway
                .send_text(
                    chat_id,
                    &content::menu_item_text(item, sender.id),
                    Some(content::back_keyboard()),
                )
                .await
            {
                error!("Failed to present menu content to user {}: {e}", sender.id);
            }
        } else if let Err(e) = self
            .gateway
            .send_text(chat_id, content::RESTART_REQUIRED, None)
            .await
        {
            warn!("Failed to send restart notice to user {}: {e}", sender.id);
        }
    }

    pub async fn handle_back_to_menu(&self, sender: &Sender, chat_id: i64) {
        if self.sessions.stage(sender.id) == Some(Stage::MainMenu) {
            self.present_main_menu(chat_id).await;
        }
    }

    /// Free text outside the recognized set.
    pub async fn handle_fallback(&self, sender: &Sender, chat_id: i64) {
        if let Err(e) = self
            .gateway
            .send_text(chat_id, content::USE_MENU_NOTICE, None)
            .await
        {
            warn!("Failed to send menu notice to user {}: {e}", sender.id);
        }
    }

    async fn present_main_menu(&self, chat_id: i64) {
        if let Err(e) = self
            .gateway
            .send_text(
                chat_id,
                &content::main_menu_text(),
                Some(content::main_menu_keyboard()),
            )
            .await
        {
            error!("Failed to present main menu in chat {chat_id}: {e}");
        }
    }
}
