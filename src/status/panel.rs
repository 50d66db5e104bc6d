// src/status/panel.rs
//
// Pure rendering: snapshot -> panel payload. The Discord-specific embed
// construction lives behind the ChatApi boundary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::fetcher::StatusSnapshot;
use crate::config::ServerConfig;

pub const ONLINE_COLOR: u32 = 0x2ECC71;
pub const OFFLINE_COLOR: u32 = 0xE74C3C;

/// Discord caps embed field values at 1024 characters.
pub const MAX_FIELD_LEN: usize = 1024;

#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<PanelField>,
    pub footer: String,
    pub icon: Option<PanelIcon>,
}

#[derive(Debug, Clone)]
pub struct PanelField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone)]
pub struct PanelIcon {
    pub path: PathBuf,
    pub filename: String,
}

pub fn render(server: &ServerConfig, snapshot: &StatusSnapshot, now: DateTime<Utc>) -> Panel {
    let mut fields = Vec::new();
    let (description, color) = match snapshot {
        StatusSnapshot::Online {
            players_online,
            players_max,
            latency_ms,
            description,
            sample,
        } => {
            fields.push(PanelField {
                name: "Players".into(),
                value: format!("{players_online}/{players_max}"),
                inline: true,
            });
            fields.push(PanelField {
                name: "Latency".into(),
                value: format!("{latency_ms} ms"),
                inline: true,
            });
            if !sample.is_empty() {
                fields.push(PanelField {
                    name: "Online Players".into(),
                    value: truncate_field(&sample.join("\n"), MAX_FIELD_LEN),
                    inline: false,
                });
            }
            (description.clone(), ONLINE_COLOR)
        }
        StatusSnapshot::Offline { error } => {
            fields.push(PanelField {
                name: "Error".into(),
                value: truncate_field(error, MAX_FIELD_LEN),
                inline: false,
            });
            ("**Server Offline**".to_string(), OFFLINE_COLOR)
        }
    };

    Panel {
        title: format!("{} Status", server.name),
        description,
        color,
        fields,
        footer: format!("Last updated: {} UTC", now.format("%Y-%m-%d %H:%M:%S")),
        icon: icon_for(&server.icon_path),
    }
}

fn icon_for(path: &Path) -> Option<PanelIcon> {
    let filename = path.file_name()?.to_str()?.to_string();
    Some(PanelIcon {
        path: path.to_path_buf(),
        filename,
    })
}

/// Truncates to at most `max` characters, ending in `...` when cut.
pub fn truncate_field(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
