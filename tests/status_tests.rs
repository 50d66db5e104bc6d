// File: tests/status_tests.rs

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use craftlink::Error;
use craftlink::config::ServerConfig;
use craftlink::platforms::minecraft::query::{QueryResponse, ServerQuery};
use craftlink::status::fetcher::{StatusSnapshot, fetch};
use craftlink::status::panel::{self, MAX_FIELD_LEN, OFFLINE_COLOR, ONLINE_COLOR};

struct HealthyQuery;

#[async_trait]
impl ServerQuery for HealthyQuery {
    async fn status(&self, _host: &str, _port: u16) -> Result<QueryResponse, Error> {
        Ok(QueryResponse {
            latency_ms: 42,
            players_online: 3,
            players_max: 20,
            sample: vec!["Alice".into(), "Bob".into()],
            description: "A Minecraft Server".into(),
        })
    }
}

struct FailingQuery;

#[async_trait]
impl ServerQuery for FailingQuery {
    async fn status(&self, host: &str, port: u16) -> Result<QueryResponse, Error> {
        Err(Error::Query(format!("connect {host}:{port}: connection refused")))
    }
}

struct HangingQuery;

#[async_trait]
impl ServerQuery for HangingQuery {
    async fn status(&self, _host: &str, _port: u16) -> Result<QueryResponse, Error> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(Error::Query("unreachable".into()))
    }
}

fn server_config(name: &str) -> ServerConfig {
    ServerConfig {
        name: name.into(),
        host: "mc.example.com".into(),
        port: 25565,
        icon_path: PathBuf::from("images/vanilla.jpg"),
    }
}

#[tokio::test]
async fn healthy_query_maps_into_an_online_snapshot() {
    let snapshot = fetch(&HealthyQuery, "mc.example.com", 25565, Duration::from_secs(5)).await;
    match snapshot {
        StatusSnapshot::Online {
            players_online,
            players_max,
            latency_ms,
            description,
            sample,
        } => {
            assert_eq!(players_online, 3);
            assert_eq!(players_max, 20);
            assert_eq!(latency_ms, 42);
            assert_eq!(description, "A Minecraft Server");
            assert_eq!(sample, vec!["Alice".to_string(), "Bob".to_string()]);
        }
        StatusSnapshot::Offline { error } => panic!("expected online, got offline: {error}"),
    }
}

#[tokio::test]
async fn failing_query_yields_offline_snapshot() {
    let snapshot = fetch(&FailingQuery, "mc.example.com", 25565, Duration::from_secs(5)).await;
    match snapshot {
        StatusSnapshot::Offline { error } => assert!(!error.is_empty()),
        StatusSnapshot::Online { .. } => panic!("expected offline snapshot"),
    }
}

#[tokio::test]
async fn hanging_query_is_cut_off_by_the_timeout() {
    let snapshot = fetch(&HangingQuery, "mc.example.com", 25565, Duration::from_millis(50)).await;
    match snapshot {
        StatusSnapshot::Offline { error } => assert!(error.contains("timed out")),
        StatusSnapshot::Online { .. } => panic!("expected offline snapshot"),
    }
}

#[test]
fn online_panel_carries_players_and_latency() {
    let snapshot = StatusSnapshot::Online {
        players_online: 3,
        players_max: 20,
        latency_ms: 42,
        description: "A Minecraft Server".into(),
        sample: vec!["Alice".into(), "Bob".into()],
    };
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
    let panel = panel::render(&server_config("VANILLA"), &snapshot, now);

    assert_eq!(panel.title, "VANILLA Status");
    assert_eq!(panel.description, "A Minecraft Server");
    assert_eq!(panel.color, ONLINE_COLOR);
    assert_eq!(panel.footer, "Last updated: 2025-06-01 10:00:00 UTC");

    let players = panel.fields.iter().find(|f| f.name == "Players").unwrap();
    assert_eq!(players.value, "3/20");
    let latency = panel.fields.iter().find(|f| f.name == "Latency").unwrap();
    assert_eq!(latency.value, "42 ms");
    let list = panel.fields.iter().find(|f| f.name == "Online Players").unwrap();
    assert_eq!(list.value, "Alice\nBob");

    let icon = panel.icon.as_ref().unwrap();
    assert_eq!(icon.filename, "vanilla.jpg");
}

#[test]
fn offline_panel_carries_the_error() {
    let snapshot = StatusSnapshot::Offline {
        error: "connection refused".into(),
    };
    let panel = panel::render(&server_config("MODDED"), &snapshot, Utc::now());

    assert_eq!(panel.title, "MODDED Status");
    assert_eq!(panel.description, "**Server Offline**");
    assert_eq!(panel.color, OFFLINE_COLOR);
    let error = panel.fields.iter().find(|f| f.name == "Error").unwrap();
    assert_eq!(error.value, "connection refused");
}

#[test]
fn long_player_list_is_truncated_with_ellipsis() {
    let sample: Vec<String> = (0..200).map(|i| format!("player_{i:04}")).collect();
    let snapshot = StatusSnapshot::Online {
        players_online: 200,
        players_max: 500,
        latency_ms: 10,
        description: String::new(),
        sample,
    };
    let panel = panel::render(&server_config("VANILLA"), &snapshot, Utc::now());
    let list = panel.fields.iter().find(|f| f.name == "Online Players").unwrap();

    assert_eq!(list.value.chars().count(), MAX_FIELD_LEN);
    assert!(list.value.ends_with("..."));
}

#[test]
fn short_player_list_is_untouched() {
    let value = "Alice\nBob\nCarol";
    assert_eq!(panel::truncate_field(value, MAX_FIELD_LEN), value);
}
