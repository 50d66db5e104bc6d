// src/platforms/minecraft/query.rs
//
// Server List Ping boundary. The wire protocol itself lives in `craftping`;
// this module normalizes its response and hides it behind a trait so the
// status fetcher and the tests never touch the network type directly.

use std::time::Instant;

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::Error;

#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Whole milliseconds, floored.
    pub latency_ms: u64,
    pub players_online: u32,
    pub players_max: u32,
    /// Player name sample; servers may report none even when populated.
    pub sample: Vec<String>,
    /// MOTD flattened to plain text.
    pub description: String,
}

#[async_trait]
pub trait ServerQuery: Send + Sync {
    async fn status(&self, host: &str, port: u16) -> Result<QueryResponse, Error>;
}

/// Pings over a fresh TCP connection per query. Latency covers the full
/// connect-plus-handshake round trip.
pub struct SlpQuery;

#[async_trait]
impl ServerQuery for SlpQuery {
    async fn status(&self, host: &str, port: u16) -> Result<QueryResponse, Error> {
        let started = Instant::now();
        let mut stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| Error::Query(format!("connect {host}:{port}: {e}")))?;
        let pong = craftping::tokio::ping(&mut stream, host, port)
            .await
            .map_err(|e| Error::Query(format!("ping {host}:{port}: {e}")))?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let sample = pong
            .sample
            .map(|players| players.into_iter().map(|p| p.name).collect())
            .unwrap_or_default();

        Ok(QueryResponse {
            latency_ms,
            players_online: pong.online_players as u32,
            players_max: pong.max_players as u32,
            sample,
            description: flatten_chat(&pong.description),
        })
    }
}

/// Collapses the SLP rich-text MOTD into plain text, dropping formatting.
fn flatten_chat(chat: &craftping::Chat) -> String {
    let mut out = String::new();
    push_chat(chat, &mut out);
    out
}

fn push_chat(chat: &craftping::Chat, out: &mut String) {
    out.push_str(&chat.text);
    for child in &chat.extra {
        push_chat(child, out);
    }
}
