// src/platforms/discord/runtime.rs
//
// Gateway side of the Discord boundary. The shard runner:
//   - watches for Ready to publish readiness and our own user id
//   - forwards inbound channel messages to `tx` for the relay to consume

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

use twilight_gateway::{
    self as gateway, CloseFrame, Config, Event, EventTypeFlags, Intents, MessageSender, Shard,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

use super::api::DiscordApi;
use crate::Error;

/// One inbound channel message, reduced to what the relay needs.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel_id: Id<ChannelMarker>,
    pub author_display_name: String,
    pub content: String,
    /// True when this bot authored the message. The relay drops these to
    /// avoid echo loops.
    pub from_self: bool,
}

async fn shard_runner(
    mut shard: Shard,
    tx: UnboundedSender<InboundMessage>,
    ready_tx: watch::Sender<Option<Id<UserMarker>>>,
) {
    let shard_id = shard.id().number();
    info!("shard {shard_id} started; listening for events");

    let mut self_id: Option<Id<UserMarker>> = None;

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        match item {
            Ok(Event::Ready(ready)) => {
                info!(
                    "shard {shard_id} ready as {} (id={})",
                    ready.user.name, ready.user.id
                );
                self_id = Some(ready.user.id);
                let _ = ready_tx.send(Some(ready.user.id));
            }
            Ok(Event::MessageCreate(msg)) => {
                let from_self = self_id.is_some_and(|id| id == msg.author.id);
                let author_display_name = msg
                    .member
                    .as_ref()
                    .and_then(|m| m.nick.clone())
                    .or_else(|| msg.author.global_name.clone())
                    .unwrap_or_else(|| msg.author.name.clone());

                let _ = tx.send(InboundMessage {
                    channel_id: msg.channel_id,
                    author_display_name,
                    content: msg.content.clone(),
                    from_self,
                });
            }
            Ok(event) => {
                trace!("shard {shard_id} ignoring event {:?}", event.kind());
            }
            Err(err) => {
                error!("shard {shard_id} error receiving event: {err:?}");
            }
        }
    }

    warn!("shard {shard_id} event loop ended");
}

/// Owns the gateway shards and the HTTP client. Consumers take inbound
/// messages via `next_message` and perform HTTP operations through the
/// `DiscordApi` handed out by `api()`.
pub struct DiscordPlatform {
    token: String,
    rx: Mutex<Option<UnboundedReceiver<InboundMessage>>>,
    shard_tasks: Vec<JoinHandle<()>>,
    shard_senders: Vec<MessageSender>,
    http: Option<Arc<HttpClient>>,
    ready_tx: watch::Sender<Option<Id<UserMarker>>>,
    ready_rx: watch::Receiver<Option<Id<UserMarker>>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        let (ready_tx, ready_rx) = watch::channel(None);
        Self {
            token,
            rx: Mutex::new(None),
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http: None,
            ready_tx,
            ready_rx,
        }
    }

    /// Spawns one runner task per recommended shard and wires up the inbound
    /// message channel.
    pub async fn connect(&mut self) -> Result<(), Error> {
        let (tx, rx) = unbounded_channel::<InboundMessage>();
        {
            let mut guard = self.rx.lock().await;
            *guard = Some(rx);
        }

        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        self.http = Some(http_client.clone());

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT,
        );

        let shards = gateway::create_recommended(&http_client, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Discord(format!("create_recommended error: {e}")))?;

        for shard in shards {
            self.shard_senders.push(shard.sender());

            let tx_for_shard = tx.clone();
            let ready_for_shard = self.ready_tx.clone();
            let handle = tokio::spawn(async move {
                shard_runner(shard, tx_for_shard, ready_for_shard).await;
            });
            self.shard_tasks.push(handle);
        }

        Ok(())
    }

    /// Blocks until some shard has seen Ready; returns our own user id.
    pub async fn wait_until_ready(&self) -> Result<Id<UserMarker>, Error> {
        let mut rx = self.ready_rx.clone();
        let guard = rx
            .wait_for(|value| value.is_some())
            .await
            .map_err(|_| Error::Discord("gateway closed before ready".into()))?;
        (*guard).ok_or_else(|| Error::Discord("gateway closed before ready".into()))
    }

    /// HTTP-side handle, valid once connected.
    pub fn api(&self, self_id: Id<UserMarker>) -> Result<DiscordApi, Error> {
        let http = self
            .http
            .clone()
            .ok_or_else(|| Error::Discord("not connected".into()))?;
        Ok(DiscordApi::new(http, self_id))
    }

    /// Next inbound message, or `None` once every shard has shut down.
    pub async fn next_message(&self) -> Option<InboundMessage> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    pub async fn disconnect(&mut self) -> Result<(), Error> {
        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }
        self.shard_senders.clear();
        self.shard_tasks.clear();

        {
            let mut guard = self.rx.lock().await;
            *guard = None;
        }
        Ok(())
    }
}
