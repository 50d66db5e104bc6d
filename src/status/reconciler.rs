// src/status/reconciler.rs
//
// Find-or-create loop body for the status panels. Each monitored server owns
// at most one live panel message; the binding lives here and nowhere else.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

use super::fetcher;
use super::panel::{self, Panel};
use crate::Error;
use crate::config::ServerConfig;
use crate::platforms::discord::api::{ChatApi, EditOutcome};
use crate::platforms::minecraft::query::ServerQuery;

struct MonitoredServer {
    config: ServerConfig,
    bound_message_id: Option<Id<MessageMarker>>,
}

pub struct Reconciler {
    api: Arc<dyn ChatApi>,
    query: Arc<dyn ServerQuery>,
    channel: Id<ChannelMarker>,
    servers: Vec<MonitoredServer>,
    scan_limit: u16,
    query_timeout: Duration,
}

impl Reconciler {
    pub fn new(
        api: Arc<dyn ChatApi>,
        query: Arc<dyn ServerQuery>,
        channel: Id<ChannelMarker>,
        servers: Vec<ServerConfig>,
        scan_limit: u16,
        query_timeout: Duration,
    ) -> Self {
        let servers = servers
            .into_iter()
            .map(|config| MonitoredServer {
                config,
                bound_message_id: None,
            })
            .collect();
        Self {
            api,
            query,
            channel,
            servers,
            scan_limit,
            query_timeout,
        }
    }

    /// One full pass over every monitored server, in configured order. A
    /// failing server is logged and skipped; the rest of the pass continues.
    pub async fn tick(&mut self) {
        if !self.api.channel_exists(self.channel).await {
            warn!(
                "status channel {} is not reachable; skipping status tick",
                self.channel
            );
            return;
        }

        for idx in 0..self.servers.len() {
            if let Err(e) = self.reconcile_one(idx).await {
                warn!(
                    "status update for {} failed: {e}",
                    self.servers[idx].config.name
                );
            }
        }
    }

    async fn reconcile_one(&mut self, idx: usize) -> Result<(), Error> {
        let config = self.servers[idx].config.clone();
        let snapshot = fetcher::fetch(
            self.query.as_ref(),
            &config.host,
            config.port,
            self.query_timeout,
        )
        .await;
        let panel = panel::render(&config, &snapshot, Utc::now());

        if let Some(message_id) = self.servers[idx].bound_message_id {
            match self.api.edit_panel(self.channel, message_id, &panel).await? {
                EditOutcome::Updated => return Ok(()),
                EditOutcome::Missing => {
                    info!("bound status message for {} vanished; rebinding", config.name);
                    self.servers[idx].bound_message_id = None;
                }
            }
        }

        if let Some(adopted) = self.adopt_existing(&config.name, &panel).await? {
            self.servers[idx].bound_message_id = Some(adopted);
            return Ok(());
        }

        let message_id = self.api.send_panel(self.channel, &panel).await?;
        self.servers[idx].bound_message_id = Some(message_id);
        Ok(())
    }

    /// Scans recent channel history for a panel this bot posted earlier for
    /// the same server, refreshes the first hit and stops scanning.
    async fn adopt_existing(
        &self,
        server_name: &str,
        panel: &Panel,
    ) -> Result<Option<Id<MessageMarker>>, Error> {
        let recent = self.api.recent_messages(self.channel, self.scan_limit).await?;
        for message in recent {
            if !message.from_self {
                continue;
            }
            let Some(title) = &message.embed_title else {
                continue;
            };
            if !title.starts_with(server_name) {
                continue;
            }
            match self.api.edit_panel(self.channel, message.id, panel).await {
                Ok(EditOutcome::Updated) => return Ok(Some(message.id)),
                Ok(EditOutcome::Missing) => continue,
                Err(e) => {
                    warn!("could not refresh candidate status message {}: {e}", message.id);
                    continue;
                }
            }
        }
        Ok(None)
    }
}
