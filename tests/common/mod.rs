#![allow(dead_code)]

//! Shared test fixtures: an in-memory gateway with programmable membership
//! answers and per-chat send failures, plus inbound event builders.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use turnstile::config::{BotConfig, ChannelConfig};
use turnstile::event::{CallbackAction, Event, Inbound, Sender};
use turnstile::gateway::{
    Gateway, GatewayError, Keyboard, MembershipStatus, MessageRef, Payload,
};

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub payload: Payload,
    pub keyboard: Option<Keyboard>,
    pub message: MessageRef,
}

#[derive(Debug, Clone)]
pub struct EditedMessage {
    pub message: MessageRef,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

#[derive(Default)]
pub struct MockGateway {
    next_message_id: AtomicI32,
    pub sent: Mutex<Vec<SentMessage>>,
    pub edits: Mutex<Vec<EditedMessage>>,
    pub deleted: Mutex<Vec<MessageRef>>,
    memberships: Mutex<HashMap<(i64, i64), MembershipStatus>>,
    erroring_channels: Mutex<HashSet<i64>>,
    failing_chats: Mutex<HashSet<i64>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_membership(&self, channel_id: i64, user_id: i64, status: MembershipStatus) {
        self.memberships
            .lock()
            .insert((channel_id, user_id), status);
    }

    /// Make membership queries against `channel_id` fail.
    pub fn break_channel(&self, channel_id: i64) {
        self.erroring_channels.lock().insert(channel_id);
    }

    /// Make every send to `chat_id` fail.
    pub fn fail_sends_to(&self, chat_id: i64) {
        self.failing_chats.lock().insert(chat_id);
    }

    /// Texts delivered to `chat_id`, in order. Media payloads contribute
    /// their caption (or nothing).
    pub fn texts_sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .filter_map(|m| match &m.payload {
                Payload::Text(text) => Some(text.clone()),
                Payload::Photo { caption, .. }
                | Payload::Video { caption, .. }
                | Payload::Document { caption, .. } => caption.clone(),
            })
            .collect()
    }

    pub fn last_text_sent_to(&self, chat_id: i64) -> Option<String> {
        self.texts_sent_to(chat_id).pop()
    }

    pub fn last_sent_to(&self, chat_id: i64) -> Option<SentMessage> {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .last()
            .cloned()
    }

    pub fn payloads_sent_to(&self, chat_id: i64) -> Vec<Payload> {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .map(|m| m.payload.clone())
            .collect()
    }

    pub fn last_edit(&self) -> Option<EditedMessage> {
        self.edits.lock().last().cloned()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn send(
        &self,
        chat_id: i64,
        payload: &Payload,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, GatewayError> {
        if self.failing_chats.lock().contains(&chat_id) {
            return Err(GatewayError::SendFailed(chat_id, "chat unreachable".into()));
        }
        let message = MessageRef {
            chat_id,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1,
        };
        self.sent.lock().push(SentMessage {
            chat_id,
            payload: payload.clone(),
            keyboard,
            message,
        });
        Ok(message)
    }

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError> {
        self.edits.lock().push(EditedMessage {
            message,
            text: text.to_owned(),
            keyboard,
        });
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> Result<(), GatewayError> {
        self.deleted.lock().push(message);
        Ok(())
    }

    async fn membership(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<MembershipStatus, GatewayError> {
        if self.erroring_channels.lock().contains(&channel_id) {
            return Err(GatewayError::MembershipQueryFailed(
                channel_id,
                "upstream unavailable".into(),
            ));
        }
        Ok(self
            .memberships
            .lock()
            .get(&(channel_id, user_id))
            .copied()
            .unwrap_or(MembershipStatus::Left))
    }
}

pub const CHANNEL_A: i64 = -1001;
pub const CHANNEL_B: i64 = -1002;

pub fn channel(name: &str, chat_id: i64) -> ChannelConfig {
    ChannelConfig {
        name: name.to_owned(),
        link: Url::parse("https://example.com/channel").expect("static url"),
        chat_id,
    }
}

pub fn test_config(admin_ids: Vec<i64>) -> BotConfig {
    BotConfig {
        token: "123:test".to_owned(),
        admin_ids,
        channels: vec![channel("Alpha", CHANNEL_A), channel("Beta", CHANNEL_B)],
        registry_path: "unused".into(),
        ledger_path: "unused".into(),
        log_level: None,
    }
}

/// Mark `user_id` as a member of both configured channels.
pub fn join_all_channels(gateway: &MockGateway, user_id: i64) {
    gateway.set_membership(CHANNEL_A, user_id, MembershipStatus::Member);
    gateway.set_membership(CHANNEL_B, user_id, MembershipStatus::Member);
}

pub fn sender(user_id: i64) -> Sender {
    Sender {
        id: user_id,
        username: Some(format!("user{user_id}")),
        first_name: Some("Test".to_owned()),
        last_name: None,
    }
}

/// An inbound text message from `user_id` in their private chat.
pub fn text_from(user_id: i64, text: &str) -> Inbound {
    Inbound {
        sender: sender(user_id),
        chat_id: user_id,
        event: Event::decode_text(text),
    }
}

/// An inbound button press on `origin` carrying callback `data`.
pub fn callback_from(user_id: i64, data: &str, origin: MessageRef) -> Inbound {
    let action = CallbackAction::decode(data).expect("recognized callback data");
    Inbound {
        sender: sender(user_id),
        chat_id: user_id,
        event: Event::Callback {
            action,
            message: origin,
        },
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
