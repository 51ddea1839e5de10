//! Gated-onboarding bot: a per-user admission funnel (channel membership
//! gate, then terms agreement, then the main menu) with an admin panel for
//! broadcasts, user analytics and bans.
//!
//! The core is transport-agnostic: all outbound traffic goes through the
//! [`gateway::Gateway`] trait, and incoming updates are decoded into
//! [`event::Inbound`] values before they reach [`dispatcher::App`]. The
//! `telegram` module is the only place that knows about Telegram.

pub mod admin;
pub mod broadcast;
pub mod config;
pub mod content;
pub mod dispatcher;
pub mod event;
pub mod gateway;
pub mod ledger;
pub mod membership;
pub mod onboarding;
pub mod registry;
pub mod session;
pub mod store;
pub mod telegram;

pub use config::BotConfig;
pub use dispatcher::App;
pub use event::{Event, Inbound, Sender};
pub use gateway::{Gateway, GatewayError, Keyboard, MessageRef, Payload};
pub use ledger::BroadcastLedger;
pub use registry::Registry;
