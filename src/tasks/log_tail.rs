// src/tasks/log_tail.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::info;

use crate::logtail::parser;
use crate::logtail::tail::LogTail;
use crate::platforms::minecraft::query::ServerQuery;
use crate::relay::ChatRelay;
use crate::status::fetcher;

/// Knobs for the log tail loop.
pub struct LogTailSettings {
    pub host: String,
    pub port: u16,
    pub poll_interval: Duration,
    pub offline_backoff: Duration,
    pub query_timeout: Duration,
}

/// Tails the server log and forwards parsed events to the relay channel,
/// preserving file order within each poll batch. While the server is offline
/// the loop backs off for longer instead of hammering a down target. Every
/// failure inside a cycle is handled where it happens; the loop never exits.
pub fn spawn_log_tail_task(
    mut tail: LogTail,
    relay: Arc<ChatRelay>,
    query: Arc<dyn ServerQuery>,
    settings: LogTailSettings,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let probe = fetcher::fetch(
                query.as_ref(),
                &settings.host,
                settings.port,
                settings.query_timeout,
            )
            .await;
            if !probe.is_online() {
                info!(
                    "{}:{} appears offline; pausing chat relay for {}s",
                    settings.host,
                    settings.port,
                    settings.offline_backoff.as_secs()
                );
                sleep(settings.offline_backoff).await;
                continue;
            }

            for line in tail.poll().await {
                if let Some(event) = parser::classify(&line) {
                    relay.forward_event(event).await;
                }
            }

            sleep(settings.poll_interval).await;
        }
    })
}
