// src/tasks/inbound_relay.rs

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::platforms::discord::runtime::DiscordPlatform;
use crate::relay::ChatRelay;

/// Pumps gateway message events into the relay until the stream closes.
pub fn spawn_inbound_relay_task(
    platform: Arc<DiscordPlatform>,
    relay: Arc<ChatRelay>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = platform.next_message().await {
            relay.handle_inbound(message).await;
        }
        warn!("gateway message stream ended; inbound relay stopped");
    })
}
