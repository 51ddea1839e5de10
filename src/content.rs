//! Static texts, button labels and keyboard layouts.
//!
//! Everything user-facing lives here so the flows stay free of copy. Texts
//! use the transport's HTML formatting.

use crate::config::ChannelConfig;
use crate::event::{AdminMenuItem, MenuItem};
use crate::gateway::{Button, Keyboard};
use crate::registry::Analytics;

pub const CONFIRM_JOINED_CALLBACK: &str = "joined_all";
pub const AGREE_TERMS_CALLBACK: &str = "agree_terms";
pub const DECLINE_TERMS_CALLBACK: &str = "not_agree_terms";

pub const BACK_TO_MENU_LABEL: &str = "🔙 Back to Menu";
pub const CANCEL_LABEL: &str = "❌ Cancel";
pub const CANCEL_BROADCAST_LABEL: &str = "❌ Cancel Broadcast";

pub const BANNED_NOTICE: &str = "❌ You are banned from using this bot!";
pub const NO_ADMIN_PERMISSION: &str = "❌ You don't have permission to access the admin panel!";
pub const COMPLETE_PREVIOUS_STEPS: &str = "❌ Please complete the previous steps first!";
pub const RESTART_REQUIRED: &str =
    "❌ Please complete the setup process first, or /start the bot again!";
pub const USE_MENU_NOTICE: &str = "❌ Please use the menu buttons or /start the bot!";
pub const INVALID_USER_ID: &str = "❌ Invalid user id! Please send a valid number.";
pub const BROADCAST_CANCELLED: &str = "❌ Broadcast cancelled!";
pub const OPERATION_CANCELLED: &str = "❌ Operation cancelled!";
pub const BROADCAST_IN_PROGRESS: &str =
    "📤 A broadcast is already running. Please wait for it to finish.";
pub const EXITED_ADMIN: &str = "👋 Exited admin panel!";
pub const USER_BANNED_NOTICE: &str = "🚫 You have been banned from using this bot!";
pub const USER_UNBANNED_NOTICE: &str =
    "✅ You have been unbanned! You can now use the bot again.";

pub fn welcome_text() -> String {
    "<b>🔐 Turnstile - Member Access</b>\n\n\
     This bot is reserved for community members.\n\n\
     <b>Access required:</b>\n\
     Join all channels below and tap <b>\"Joined All Channels\"</b> to continue.\n\n\
     <b>Status:</b> verification pending..."
        .to_string()
}

pub const JOIN_FAILURE_TEXT: &str = "❌ <b>Please join all channels first!</b>\n\n\
     Make sure you've joined ALL required channels before tapping the button below.\n\n\
     Tap the channel buttons above to join them!";

/// Channel buttons two per row, with the confirm control on its own row.
pub fn join_keyboard(channels: &[ChannelConfig]) -> Keyboard {
    let mut rows: Vec<Vec<Button>> = Vec::new();
    let mut row: Vec<Button> = Vec::new();
    for channel in channels {
        row.push(Button::Url {
            label: channel.name.clone(),
            url: channel.link.clone(),
        });
        if row.len() == 2 {
            rows.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows.push(vec![Button::Callback {
        label: "✅ Joined All Channels".to_string(),
        data: CONFIRM_JOINED_CALLBACK.to_string(),
    }]);
    Keyboard::Inline(rows)
}

pub fn terms_text() -> String {
    "<b>✅ Terms & Conditions</b>\n\n\
     By using this bot you agree that you are solely responsible for your actions.\n\
     Abuse may result in a permanent ban 🚫.\n\
     Using this bot means you have <b>read and accepted</b> these terms."
        .to_string()
}

pub const TERMS_DECLINED_TEXT: &str = "❌ <b>You must agree to the terms to use this bot!</b>\n\n\
     Please read the terms carefully and agree to continue.";

pub fn terms_keyboard() -> Keyboard {
    Keyboard::Inline(vec![
        vec![Button::Callback {
            label: "✅ I Agree".to_string(),
            data: AGREE_TERMS_CALLBACK.to_string(),
        }],
        vec![Button::Callback {
            label: "❌ Not Agree".to_string(),
            data: DECLINE_TERMS_CALLBACK.to_string(),
        }],
    ])
}

pub fn main_menu_text() -> String {
    "<b>🎯 Main Menu</b>\n\n\
     Welcome! Pick an option below:"
        .to_string()
}

pub fn main_menu_keyboard() -> Keyboard {
    Keyboard::Reply(vec![
        vec![
            MenuItem::ReferralLink.label().to_string(),
            MenuItem::MyStats.label().to_string(),
        ],
        vec![
            MenuItem::Leaderboard.label().to_string(),
            MenuItem::Rewards.label().to_string(),
        ],
        vec![MenuItem::Support.label().to_string()],
    ])
}

pub fn back_keyboard() -> Keyboard {
    Keyboard::Reply(vec![vec![BACK_TO_MENU_LABEL.to_string()]])
}

pub fn cancel_keyboard() -> Keyboard {
    Keyboard::Reply(vec![vec![CANCEL_LABEL.to_string()]])
}

pub fn cancel_broadcast_keyboard() -> Keyboard {
    Keyboard::Reply(vec![vec![CANCEL_BROADCAST_LABEL.to_string()]])
}

/// Per-option content. Each option's text embeds the requesting user's id in
/// its personal link.
pub fn menu_item_text(item: MenuItem, user_id: i64) -> String {
    match item {
        MenuItem::ReferralLink => format!(
            "<b>🔗 Your Referral Link</b>\n\n\
             Share this link to invite new members:\n\
             https://turnstile.example.com/join?ref={user_id}\n\n\
             Every member who joins through it counts towards your rewards."
        ),
        MenuItem::MyStats => format!(
            "<b>📊 My Stats</b>\n\n\
             Your personal dashboard:\n\
             https://turnstile.example.com/stats?id={user_id}\n\n\
             Invites, activity and reward progress in one place."
        ),
        MenuItem::Leaderboard => format!(
            "<b>🏆 Leaderboard</b>\n\n\
             See where you rank among inviters:\n\
             https://turnstile.example.com/leaderboard?id={user_id}"
        ),
        MenuItem::Rewards => format!(
            "<b>🎁 Rewards</b>\n\n\
             Claim rewards you have unlocked:\n\
             https://turnstile.example.com/rewards?id={user_id}"
        ),
        MenuItem::Support => "<b>👨‍💻 Support</b>\n\n\
             Facing an issue while using the bot?\n\
             Contact the operators and we'll get back to you."
            .to_string(),
    }
}

pub fn broadcast_prompt_text() -> String {
    "📢 <b>Broadcast Message</b>\n\n\
     Send me the message you want to broadcast to all users.\n\
     You can send text, photos, videos or documents.\n\n\
     <i>Note: the message will be sent to all active users.</i>"
        .to_string()
}

pub fn broadcast_progress_text(total: usize, sent: usize, failed: usize, percent: f64) -> String {
    format!(
        "📤 <b>Broadcasting...</b>\n\n\
         👥 Total Users: {total}\n\
         ✅ Sent: {sent}\n\
         ❌ Failed: {failed}\n\
         📊 Progress: {percent:.1}%"
    )
}

pub fn broadcast_summary_text(total: usize, sent: usize, failed: usize, rate: f64) -> String {
    format!(
        "✅ <b>Broadcast Completed!</b>\n\n\
         👥 Total Users: {total}\n\
         ✅ Successfully Sent: {sent}\n\
         ❌ Failed: {failed}\n\
         📊 Success Rate: {rate:.1}%"
    )
}

pub fn ban_prompt_text() -> String {
    "🚫 <b>Ban User</b>\n\n\
     Send me the user id of the user you want to ban.\n\
     Example: 123456789"
        .to_string()
}

pub fn unban_prompt_text() -> String {
    "✅ <b>Unban User</b>\n\n\
     Send me the user id of the user you want to unban.\n\
     Example: 123456789"
        .to_string()
}

pub fn ban_confirmed_text(user_id: i64) -> String {
    format!("✅ User {user_id} has been banned!")
}

pub fn unban_confirmed_text(user_id: i64) -> String {
    format!("✅ User {user_id} has been unbanned!")
}

pub fn user_not_found_text(user_id: i64) -> String {
    format!("❌ User {user_id} not found in the registry!")
}

pub fn total_users_text(count: usize) -> String {
    format!("👥 <b>Total Active Users:</b> {count}")
}

pub fn admin_panel_text(stats: &Analytics) -> String {
    format!(
        "🔧 <b>Admin Panel</b>\n\n\
         📊 <b>Quick Stats:</b>\n\
         👥 Total Users: {}\n\
         ✅ Active Users: {}\n\
         🚫 Banned Users: {}\n\
         📈 Today Joins: {}\n\
         🔥 Today Active: {}\n\n\
         <b>Select an option from the menu below:</b>",
        stats.total, stats.active, stats.banned, stats.joined_today, stats.active_today
    )
}

pub fn user_analysis_text(stats: &Analytics) -> String {
    format!(
        "📊 <b>Detailed User Analysis</b>\n\n\
         👥 <b>User Statistics:</b>\n\
         • Total Users: {}\n\
         • Active Users: {}\n\
         • Banned Users: {}\n\n\
         📈 <b>Growth Statistics:</b>\n\
         • Today's New Joins: {}\n\
         • This Week's Joins: {}\n\
         • Today's Active Users: {}\n\n\
         📅 <b>Activity Rate:</b>\n\
         • Daily Activity: {:.1}%",
        stats.total,
        stats.active,
        stats.banned,
        stats.joined_today,
        stats.joined_this_week,
        stats.active_today,
        stats.daily_activity_rate()
    )
}

pub fn admin_keyboard() -> Keyboard {
    Keyboard::Reply(vec![
        vec![
            AdminMenuItem::Broadcast.label().to_string(),
            AdminMenuItem::TotalUsers.label().to_string(),
        ],
        vec![
            AdminMenuItem::UserAnalysis.label().to_string(),
            AdminMenuItem::BanUser.label().to_string(),
        ],
        vec![
            AdminMenuItem::UnbanUser.label().to_string(),
            AdminMenuItem::Exit.label().to_string(),
        ],
    ])
}
