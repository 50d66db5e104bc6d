// src/relay/mod.rs
//
// Bidirectional bridge: parsed log events go out to the relay channel, relay
// channel messages come back into the game via RCON.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

use crate::logtail::parser::LogEvent;
use crate::platforms::discord::api::ChatApi;
use crate::platforms::discord::runtime::InboundMessage;
use crate::platforms::minecraft::rcon::CommandSink;

pub struct ChatRelay {
    api: Arc<dyn ChatApi>,
    sink: Arc<dyn CommandSink>,
    channel: Id<ChannelMarker>,
}

impl ChatRelay {
    pub fn new(api: Arc<dyn ChatApi>, sink: Arc<dyn CommandSink>, channel: Id<ChannelMarker>) -> Self {
        Self { api, sink, channel }
    }

    /// Log event -> Discord. Failures are logged and the event is dropped;
    /// no retry, and the tailing loop never sees the error.
    pub async fn forward_event(&self, event: LogEvent) {
        let text = match event {
            LogEvent::Chat { player, text } => format!("**{player}**: {text}"),
            LogEvent::Notice { text } => format!("*{text}*"),
        };
        if let Err(e) = self.api.send_text(self.channel, &text).await {
            warn!("could not forward log event to Discord: {e}");
        }
    }

    /// Discord -> game. Our own messages are dropped (echo loop prevention),
    /// as is anything outside the relay channel. Each forwarded message rides
    /// its own one-shot RCON connection; a failure drops the message.
    pub async fn handle_inbound(&self, message: InboundMessage) {
        if message.from_self {
            return;
        }
        if message.channel_id != self.channel {
            return;
        }
        let command = tellraw_command(&message.author_display_name, &message.content);
        if let Err(e) = self.sink.dispatch(&command).await {
            warn!(
                "could not relay message from {} to the server: {e}",
                message.author_display_name
            );
        }
    }
}

/// Builds the `tellraw` command echoing a Discord message to every player.
/// Serializing through `json!` keeps arbitrary message content escaped.
pub fn tellraw_command(author: &str, content: &str) -> String {
    let payload = json!({
        "text": "",
        "extra": [
            { "text": "[Discord] ", "color": "blue" },
            { "text": format!("{author}: "), "color": "white" },
            { "text": content, "color": "gray" }
        ]
    });
    format!("tellraw @a {payload}")
}
