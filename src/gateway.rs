//! Messaging gateway port.
//!
//! The chat transport (delivery, keyboards, callback dispatch) is an external
//! collaborator. The core talks to it only through the [`Gateway`] trait so
//! the funnel, broadcast engine and admin flows can be exercised against a
//! mock. The production implementation lives in [`crate::telegram`].

use async_trait::async_trait;
use url::Url;

/// Handle to a delivered message, used for later edits and retractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// Outbound message content. The broadcast engine mirrors the kind of the
/// payload it received from the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    Video {
        file_id: String,
        caption: Option<String>,
    },
    Document {
        file_id: String,
        caption: Option<String>,
    },
}

impl Payload {
    pub fn text(value: impl Into<String>) -> Self {
        Payload::Text(value.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Button {
    Url { label: String, url: Url },
    Callback { label: String, data: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Keyboard {
    Inline(Vec<Vec<Button>>),
    Reply(Vec<Vec<String>>),
    Remove,
}

/// A user's standing in a required channel, as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MembershipStatus {
    /// `Left` and `Kicked` mean the user is not currently in the channel.
    pub fn is_current_member(self) -> bool {
        !matches!(self, MembershipStatus::Left | MembershipStatus::Kicked)
    }
}

/// Errors originating from the transport layer.
///
/// String payloads carry the underlying transport error message. They are
/// human-readable diagnostic text, not something callers should match on.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to send message to chat {0}: {1}")]
    SendFailed(i64, String),
    #[error("Failed to edit message: {0}")]
    EditFailed(String),
    #[error("Failed to delete message: {0}")]
    DeleteFailed(String),
    #[error("Membership query failed for channel {0}: {1}")]
    MembershipQueryFailed(i64, String),
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Deliver `payload` to `chat_id`, optionally with a keyboard attached.
    async fn send(
        &self,
        chat_id: i64,
        payload: &Payload,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, GatewayError>;

    /// Replace the text of an already-delivered message. Only an inline
    /// keyboard can survive an edit; other keyboard kinds are ignored.
    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError>;

    /// Retract a delivered message.
    async fn delete(&self, message: MessageRef) -> Result<(), GatewayError>;

    /// Query a user's standing in a channel.
    async fn membership(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<MembershipStatus, GatewayError>;

    /// Convenience wrapper for plain text sends.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, GatewayError> {
        self.send(chat_id, &Payload::text(text), keyboard).await
    }
}
