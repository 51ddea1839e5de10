//! Membership gate: all-or-nothing check across the required channels.

use std::sync::Arc;

use log::{error, info};

use crate::config::ChannelConfig;
use crate::gateway::Gateway;

/// Queries the gateway for a user's standing in every required channel.
///
/// Fail-closed: a status of `Left` or `Kicked` fails that channel, and any
/// query error fails the whole check immediately without consulting the
/// remaining channels. Duplicate channel entries are checked once per entry.
pub struct MembershipGate<G> {
    gateway: Arc<G>,
    channels: Vec<ChannelConfig>,
}

impl<G: Gateway> MembershipGate<G> {
    pub fn new(gateway: Arc<G>, channels: Vec<ChannelConfig>) -> Self {
        Self { gateway, channels }
    }

    /// True only if every channel query succeeds and reports current
    /// membership.
    pub async fn check_all(&self, user_id: i64) -> bool {
        for channel in &self.channels {
            match self.gateway.membership(channel.chat_id, user_id).await {
                Ok(status) if status.is_current_member() => {
                    info!(
                        "User {user_id} found in channel {} with status {status:?}",
                        channel.name
                    );
                }
                Ok(_) => {
                    info!("User {user_id} not in channel {}", channel.name);
                    return false;
                }
                Err(e) => {
                    error!(
                        "Error checking membership for channel {}: {e}",
                        channel.name
                    );
                    return false;
                }
            }
        }
        true
    }
}
