//! Inbound events, decoded once at the transport boundary.
//!
//! The transport delivers free-form strings (commands, button labels,
//! callback payloads). They are decoded here into one closed [`Event`] union
//! so the flows can match exhaustively instead of chaining string
//! comparisons. Labels that carry no structural meaning in the current
//! context (e.g. a menu label sent while a broadcast payload is awaited) can
//! be turned back into text via the `label()` accessors.

use crate::content;
use crate::gateway::{MessageRef, Payload};
use crate::registry::Profile;

/// Identity and display fields of the actor behind an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Sender {
    pub fn profile(&self) -> Profile {
        Profile {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Button-press actions carried as opaque callback payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    ConfirmJoined,
    AgreeTerms,
    DeclineTerms,
}

impl CallbackAction {
    pub fn decode(data: &str) -> Option<Self> {
        match data {
            content::CONFIRM_JOINED_CALLBACK => Some(CallbackAction::ConfirmJoined),
            content::AGREE_TERMS_CALLBACK => Some(CallbackAction::AgreeTerms),
            content::DECLINE_TERMS_CALLBACK => Some(CallbackAction::DeclineTerms),
            _ => None,
        }
    }
}

/// The five fixed main-menu options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    ReferralLink,
    MyStats,
    Leaderboard,
    Rewards,
    Support,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::ReferralLink,
        MenuItem::MyStats,
        MenuItem::Leaderboard,
        MenuItem::Rewards,
        MenuItem::Support,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::ReferralLink => "🔗 Referral Link",
            MenuItem::MyStats => "📊 My Stats",
            MenuItem::Leaderboard => "🏆 Leaderboard",
            MenuItem::Rewards => "🎁 Rewards",
            MenuItem::Support => "👨‍💻 Support",
        }
    }

    fn decode(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.label() == text)
    }
}

/// The six fixed admin-panel actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminMenuItem {
    Broadcast,
    TotalUsers,
    UserAnalysis,
    BanUser,
    UnbanUser,
    Exit,
}

impl AdminMenuItem {
    pub const ALL: [AdminMenuItem; 6] = [
        AdminMenuItem::Broadcast,
        AdminMenuItem::TotalUsers,
        AdminMenuItem::UserAnalysis,
        AdminMenuItem::BanUser,
        AdminMenuItem::UnbanUser,
        AdminMenuItem::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AdminMenuItem::Broadcast => "📢 Broadcast",
            AdminMenuItem::TotalUsers => "👥 Total Users",
            AdminMenuItem::UserAnalysis => "📊 User Analysis",
            AdminMenuItem::BanUser => "🚫 Ban User",
            AdminMenuItem::UnbanUser => "✅ Unban User",
            AdminMenuItem::Exit => "🔙 Exit Admin",
        }
    }

    fn decode(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.label() == text)
    }
}

/// Closed union of everything the transport can deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Entry command starting the funnel.
    Start,
    /// Entry command opening the admin panel.
    AdminPanel,
    /// Button press; carries a handle to the message the button lives on.
    Callback {
        action: CallbackAction,
        message: MessageRef,
    },
    Menu(MenuItem),
    BackToMenu,
    AdminMenu(AdminMenuItem),
    Cancel,
    /// Free text not matching any recognized label.
    Text(String),
    /// Media message, kept whole so it can become a broadcast payload.
    Media(Payload),
}

impl Event {
    /// Decode a plain text message (commands included).
    pub fn decode_text(text: &str) -> Event {
        match text {
            "/start" => Event::Start,
            "/admin" => Event::AdminPanel,
            content::BACK_TO_MENU_LABEL => Event::BackToMenu,
            content::CANCEL_LABEL | content::CANCEL_BROADCAST_LABEL => Event::Cancel,
            _ => {
                if let Some(item) = AdminMenuItem::decode(text) {
                    Event::AdminMenu(item)
                } else if let Some(item) = MenuItem::decode(text) {
                    Event::Menu(item)
                } else {
                    Event::Text(text.to_string())
                }
            }
        }
    }

    /// Reconstruct the event as a broadcast payload, the way the operator
    /// typed it. `None` for events that never reach the payload path
    /// (commands and callbacks).
    pub fn as_payload(&self) -> Option<Payload> {
        match self {
            Event::Text(text) => Some(Payload::text(text.clone())),
            Event::Media(payload) => Some(payload.clone()),
            Event::Menu(item) => Some(Payload::text(item.label())),
            Event::AdminMenu(item) => Some(Payload::text(item.label())),
            Event::BackToMenu => Some(Payload::text(content::BACK_TO_MENU_LABEL)),
            Event::Start | Event::AdminPanel | Event::Cancel | Event::Callback { .. } => None,
        }
    }

    /// The raw text behind the event, for flows that validate input
    /// themselves (e.g. ban-target parsing).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Event::Text(text) => Some(text),
            Event::Menu(item) => Some(item.label()),
            Event::AdminMenu(item) => Some(item.label()),
            Event::BackToMenu => Some(content::BACK_TO_MENU_LABEL),
            _ => None,
        }
    }
}

/// One decoded inbound event with its sender and originating chat.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub sender: Sender,
    pub chat_id: i64,
    pub event: Event,
}
