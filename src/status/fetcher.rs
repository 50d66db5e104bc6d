// src/status/fetcher.rs

use std::time::Duration;

use tracing::debug;

use crate::platforms::minecraft::query::ServerQuery;

/// One point-in-time result of querying a game server. Produced fresh each
/// poll, never persisted.
#[derive(Debug, Clone)]
pub enum StatusSnapshot {
    Online {
        players_online: u32,
        players_max: u32,
        latency_ms: u64,
        description: String,
        sample: Vec<String>,
    },
    Offline {
        error: String,
    },
}

impl StatusSnapshot {
    pub fn is_online(&self) -> bool {
        matches!(self, StatusSnapshot::Online { .. })
    }
}

/// Queries one server and normalizes the outcome. Never fails: connect
/// errors, protocol errors and the bounded timeout all collapse into an
/// `Offline` snapshot so an unreachable server can't take the caller down.
pub async fn fetch(
    query: &dyn ServerQuery,
    host: &str,
    port: u16,
    timeout: Duration,
) -> StatusSnapshot {
    match tokio::time::timeout(timeout, query.status(host, port)).await {
        Ok(Ok(resp)) => StatusSnapshot::Online {
            players_online: resp.players_online,
            players_max: resp.players_max,
            latency_ms: resp.latency_ms,
            description: resp.description,
            sample: resp.sample,
        },
        Ok(Err(e)) => {
            debug!("status query for {host}:{port} failed: {e}");
            StatusSnapshot::Offline {
                error: e.to_string(),
            }
        }
        Err(_) => StatusSnapshot::Offline {
            error: format!("status query timed out after {}s", timeout.as_secs()),
        },
    }
}
