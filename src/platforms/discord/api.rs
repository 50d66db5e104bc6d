// src/platforms/discord/api.rs
//
// HTTP side of the Discord boundary, behind the `ChatApi` trait so the
// reconciler and the relay can be exercised against in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use twilight_http::Client as HttpClient;
use twilight_http::error::ErrorType;
use twilight_model::channel::message::Embed;
use twilight_model::http::attachment::Attachment;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker, UserMarker};
use twilight_util::builder::embed::{
    EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource,
};

use crate::Error;
use crate::status::panel::Panel;

/// Outcome of editing a bound panel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    /// The message no longer exists (deleted out from under us).
    Missing,
}

/// A slim view of a channel message, enough for panel rediscovery.
#[derive(Debug, Clone)]
pub struct RecentMessage {
    pub id: Id<MessageMarker>,
    pub from_self: bool,
    pub embed_title: Option<String>,
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn channel_exists(&self, channel: Id<ChannelMarker>) -> bool;

    async fn send_panel(
        &self,
        channel: Id<ChannelMarker>,
        panel: &Panel,
    ) -> Result<Id<MessageMarker>, Error>;

    async fn edit_panel(
        &self,
        channel: Id<ChannelMarker>,
        message: Id<MessageMarker>,
        panel: &Panel,
    ) -> Result<EditOutcome, Error>;

    async fn recent_messages(
        &self,
        channel: Id<ChannelMarker>,
        limit: u16,
    ) -> Result<Vec<RecentMessage>, Error>;

    async fn send_text(&self, channel: Id<ChannelMarker>, text: &str) -> Result<(), Error>;
}

pub struct DiscordApi {
    http: Arc<HttpClient>,
    self_id: Id<UserMarker>,
}

impl DiscordApi {
    pub fn new(http: Arc<HttpClient>, self_id: Id<UserMarker>) -> Self {
        Self { http, self_id }
    }
}

#[async_trait]
impl ChatApi for DiscordApi {
    async fn channel_exists(&self, channel: Id<ChannelMarker>) -> bool {
        match self.http.channel(channel).await {
            Ok(_) => true,
            Err(e) => {
                warn!("channel {channel} lookup failed: {e}");
                false
            }
        }
    }

    async fn send_panel(
        &self,
        channel: Id<ChannelMarker>,
        panel: &Panel,
    ) -> Result<Id<MessageMarker>, Error> {
        let embeds = [build_embed(panel)?];
        let attachments = load_icon(panel).await;
        let response = self
            .http
            .create_message(channel)
            .embeds(&embeds)
            .attachments(&attachments)
            .await
            .map_err(|e| Error::Discord(format!("send panel: {e}")))?;
        let message = response
            .model()
            .await
            .map_err(|e| Error::Discord(format!("decode sent message: {e}")))?;
        Ok(message.id)
    }

    async fn edit_panel(
        &self,
        channel: Id<ChannelMarker>,
        message: Id<MessageMarker>,
        panel: &Panel,
    ) -> Result<EditOutcome, Error> {
        let embeds = [build_embed(panel)?];
        // The attachment rides along on every edit so the thumbnail reference
        // stays valid.
        let attachments = load_icon(panel).await;
        match self
            .http
            .update_message(channel, message)
            .embeds(Some(&embeds))
            .attachments(&attachments)
            .await
        {
            Ok(_) => Ok(EditOutcome::Updated),
            Err(e) if is_not_found(&e) => Ok(EditOutcome::Missing),
            Err(e) => Err(Error::Discord(format!("edit panel: {e}"))),
        }
    }

    async fn recent_messages(
        &self,
        channel: Id<ChannelMarker>,
        limit: u16,
    ) -> Result<Vec<RecentMessage>, Error> {
        let messages = self
            .http
            .channel_messages(channel)
            .limit(limit)
            .await
            .map_err(|e| Error::Discord(format!("fetch history: {e}")))?
            .models()
            .await
            .map_err(|e| Error::Discord(format!("decode history: {e}")))?;

        Ok(messages
            .into_iter()
            .map(|m| RecentMessage {
                id: m.id,
                from_self: m.author.id == self.self_id,
                embed_title: m.embeds.first().and_then(|e| e.title.clone()),
            })
            .collect())
    }

    async fn send_text(&self, channel: Id<ChannelMarker>, text: &str) -> Result<(), Error> {
        self.http
            .create_message(channel)
            .content(text)
            .await
            .map_err(|e| Error::Discord(format!("send message: {e}")))?;
        Ok(())
    }
}

fn is_not_found(err: &twilight_http::Error) -> bool {
    matches!(err.kind(), ErrorType::Response { status, .. } if status.get() == 404)
}

fn build_embed(panel: &Panel) -> Result<Embed, Error> {
    let mut builder = EmbedBuilder::new()
        .title(panel.title.as_str())
        .color(panel.color)
        .footer(EmbedFooterBuilder::new(panel.footer.as_str()));

    if !panel.description.is_empty() {
        builder = builder.description(panel.description.as_str());
    }

    for field in &panel.fields {
        let mut fb = EmbedFieldBuilder::new(field.name.as_str(), field.value.as_str());
        if field.inline {
            fb = fb.inline();
        }
        builder = builder.field(fb);
    }

    if let Some(icon) = &panel.icon {
        let source = ImageSource::attachment(&icon.filename)
            .map_err(|e| Error::Discord(format!("bad icon filename: {e}")))?;
        builder = builder.thumbnail(source);
    }

    Ok(builder.build())
}

/// Reads the icon asset fresh for each send/edit. A missing asset downgrades
/// the panel to no thumbnail instead of failing the whole update.
async fn load_icon(panel: &Panel) -> Vec<Attachment> {
    let Some(icon) = &panel.icon else {
        return Vec::new();
    };
    match tokio::fs::read(&icon.path).await {
        Ok(bytes) => vec![Attachment::from_bytes(icon.filename.clone(), bytes, 0)],
        Err(e) => {
            warn!("could not read icon {}: {e}", icon.path.display());
            Vec::new()
        }
    }
}
