//! In-memory session state, keyed by actor identity.
//!
//! Sessions live for the process lifetime only. A restart drops them, which
//! restarts the funnel from the channel check for everyone — an explicit
//! design boundary, not a defect. Durable data belongs in the registry.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::gateway::MessageRef;

/// Onboarding funnel stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ChannelCheck,
    TermsAgreement,
    MainMenu,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Stage::ChannelCheck => "ChannelCheck",
            Stage::TermsAgreement => "TermsAgreement",
            Stage::MainMenu => "MainMenu",
        };
        write!(f, "{stage}")
    }
}

/// Named handles to messages we may want to retract later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    Welcome,
    Terms,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub stage: Stage,
    messages: HashMap<MessageTag, MessageRef>,
}

impl Session {
    fn new() -> Self {
        Self {
            stage: Stage::ChannelCheck,
            messages: HashMap::new(),
        }
    }
}

/// Process-wide funnel sessions, keyed by user id.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<i64, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a session at the channel check, clearing any
    /// remembered message handles.
    pub fn begin(&self, user_id: i64) {
        self.inner.write().insert(user_id, Session::new());
    }

    pub fn stage(&self, user_id: i64) -> Option<Stage> {
        self.inner.read().get(&user_id).map(|s| s.stage)
    }

    pub fn set_stage(&self, user_id: i64, stage: Stage) {
        let mut sessions = self.inner.write();
        let session = sessions.entry(user_id).or_insert_with(Session::new);
        session.stage = stage;
    }

    pub fn remember(&self, user_id: i64, tag: MessageTag, message: MessageRef) {
        let mut sessions = self.inner.write();
        let session = sessions.entry(user_id).or_insert_with(Session::new);
        session.messages.insert(tag, message);
    }

    /// Remove and return a remembered handle, if any.
    pub fn take_message(&self, user_id: i64, tag: MessageTag) -> Option<MessageRef> {
        self.inner
            .write()
            .get_mut(&user_id)
            .and_then(|s| s.messages.remove(&tag))
    }
}

/// Admin sub-flows; absent means the admin is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminFlow {
    /// Waiting for the broadcast payload.
    AwaitingBroadcast,
    /// A fanout is in flight; new commands from this admin are refused.
    Broadcasting,
    AwaitingBanTarget,
    AwaitingUnbanTarget,
}

/// Process-wide admin sessions, keyed by admin id.
#[derive(Clone, Default)]
pub struct AdminSessionStore {
    inner: Arc<RwLock<HashMap<i64, AdminFlow>>>,
}

impl AdminSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flow(&self, admin_id: i64) -> Option<AdminFlow> {
        self.inner.read().get(&admin_id).copied()
    }

    pub fn set(&self, admin_id: i64, flow: AdminFlow) {
        self.inner.write().insert(admin_id, flow);
    }

    pub fn clear(&self, admin_id: i64) {
        self.inner.write().remove(&admin_id);
    }
}
