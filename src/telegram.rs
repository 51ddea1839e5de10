//! Telegram implementation of the messaging gateway, plus decoding of raw
//! Telegram updates into the crate's [`Inbound`] events.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::requests::Request;
use teloxide::types::{
    CallbackQuery, ChatMemberStatus, InlineKeyboardButton, InlineKeyboardMarkup, InputFile,
    KeyboardButton, KeyboardMarkup, KeyboardRemove, Message, MessageId, ParseMode, ReplyMarkup,
    UserId,
};

use crate::event::{CallbackAction, Event, Inbound, Sender};
use crate::gateway::{
    Button, Gateway, GatewayError, Keyboard, MembershipStatus, MessageRef, Payload,
};

pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn inline_markup(rows: Vec<Vec<Button>>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.into_iter().map(|row| {
        row.into_iter()
            .map(|button| match button {
                Button::Url { label, url } => InlineKeyboardButton::url(label, url),
                Button::Callback { label, data } => InlineKeyboardButton::callback(label, data),
            })
            .collect::<Vec<_>>()
    }))
}

fn reply_markup(keyboard: Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Inline(rows) => ReplyMarkup::InlineKeyboard(inline_markup(rows)),
        Keyboard::Reply(rows) => {
            let rows = rows
                .into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>());
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard(true))
        }
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

#[async_trait]
impl Gateway for TelegramGateway {
    async fn send(
        &self,
        chat_id: i64,
        payload: &Payload,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, GatewayError> {
        let chat = ChatId(chat_id);
        let markup = keyboard.map(reply_markup);
        let sent = match payload {
            Payload::Text(text) => {
                let mut req = self
                    .bot
                    .send_message(chat, text.clone())
                    .parse_mode(ParseMode::Html);
                if let Some(markup) = markup {
                    req = req.reply_markup(markup);
                }
                req.send().await
            }
            Payload::Photo { file_id, caption } => {
                let mut req = self.bot.send_photo(chat, InputFile::file_id(file_id.clone()));
                if let Some(caption) = caption {
                    req = req.caption(caption.clone());
                }
                if let Some(markup) = markup {
                    req = req.reply_markup(markup);
                }
                req.send().await
            }
            Payload::Video { file_id, caption } => {
                let mut req = self.bot.send_video(chat, InputFile::file_id(file_id.clone()));
                if let Some(caption) = caption {
                    req = req.caption(caption.clone());
                }
                if let Some(markup) = markup {
                    req = req.reply_markup(markup);
                }
                req.send().await
            }
            Payload::Document { file_id, caption } => {
                let mut req = self
                    .bot
                    .send_document(chat, InputFile::file_id(file_id.clone()));
                if let Some(caption) = caption {
                    req = req.caption(caption.clone());
                }
                if let Some(markup) = markup {
                    req = req.reply_markup(markup);
                }
                req.send().await
            }
        }
        .map_err(|e| GatewayError::SendFailed(chat_id, e.to_string()))?;
        Ok(MessageRef {
            chat_id,
            message_id: sent.id.0,
        })
    }

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError> {
        let mut req = self
            .bot
            .edit_message_text(
                ChatId(message.chat_id),
                MessageId(message.message_id),
                text.to_owned(),
            )
            .parse_mode(ParseMode::Html);
        // Only inline keyboards can ride along on an edit.
        if let Some(Keyboard::Inline(rows)) = keyboard {
            req = req.reply_markup(inline_markup(rows));
        }
        req.send()
            .await
            .map_err(|e| GatewayError::EditFailed(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> Result<(), GatewayError> {
        self.bot
            .delete_message(ChatId(message.chat_id), MessageId(message.message_id))
            .send()
            .await
            .map_err(|e| GatewayError::DeleteFailed(e.to_string()))?;
        Ok(())
    }

    async fn membership(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<MembershipStatus, GatewayError> {
        let member = self
            .bot
            .get_chat_member(ChatId(channel_id), UserId(user_id as u64))
            .send()
            .await
            .map_err(|e| GatewayError::MembershipQueryFailed(channel_id, e.to_string()))?;
        Ok(match member.status() {
            ChatMemberStatus::Owner => MembershipStatus::Owner,
            ChatMemberStatus::Administrator => MembershipStatus::Administrator,
            ChatMemberStatus::Member => MembershipStatus::Member,
            ChatMemberStatus::Restricted => MembershipStatus::Restricted,
            ChatMemberStatus::Left => MembershipStatus::Left,
            ChatMemberStatus::Banned => MembershipStatus::Kicked,
        })
    }
}

fn sender_from_user(user: &teloxide::types::User) -> Sender {
    Sender {
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
    }
}

/// Decode a Telegram message into an [`Inbound`] event. `None` for updates
/// we do not handle (no sender, unsupported content kind).
pub fn inbound_from_message(msg: &Message) -> Option<Inbound> {
    let sender = sender_from_user(msg.from()?);
    let caption = msg.caption().map(str::to_owned);
    let event = if let Some(text) = msg.text() {
        Event::decode_text(text)
    } else if let Some(photos) = msg.photo() {
        // Telegram delivers several sizes; the last one is the largest.
        Event::Media(Payload::Photo {
            file_id: photos.last()?.file.id.clone(),
            caption,
        })
    } else if let Some(video) = msg.video() {
        Event::Media(Payload::Video {
            file_id: video.file.id.clone(),
            caption,
        })
    } else if let Some(document) = msg.document() {
        Event::Media(Payload::Document {
            file_id: document.file.id.clone(),
            caption,
        })
    } else {
        return None;
    };
    Some(Inbound {
        sender,
        chat_id: msg.chat.id.0,
        event,
    })
}

/// Decode a callback query into an [`Inbound`] event. `None` when the
/// payload is unrecognized or the originating message is gone.
pub fn inbound_from_callback(query: &CallbackQuery) -> Option<Inbound> {
    let action = CallbackAction::decode(query.data.as_deref()?)?;
    let message = query.message.as_ref()?;
    let origin = MessageRef {
        chat_id: message.chat.id.0,
        message_id: message.id.0,
    };
    Some(Inbound {
        sender: sender_from_user(&query.from),
        chat_id: origin.chat_id,
        event: Event::Callback {
            action,
            message: origin,
        },
    })
}
