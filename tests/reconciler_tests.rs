// File: tests/reconciler_tests.rs
//
// Drives the reconciler against an in-memory chat API to pin down the
// find-or-create behavior: repeated ticks must edit, never duplicate.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

use craftlink::Error;
use craftlink::config::ServerConfig;
use craftlink::platforms::discord::api::{ChatApi, EditOutcome, RecentMessage};
use craftlink::platforms::minecraft::query::{QueryResponse, ServerQuery};
use craftlink::status::panel::Panel;
use craftlink::status::reconciler::Reconciler;

/// In-memory stand-in for the Discord HTTP boundary. Sends allocate fresh
/// message ids and prepend to the visible history, like a real channel.
#[derive(Default)]
struct MockChatApi {
    next_id: Mutex<u64>,
    sends: Mutex<Vec<(u64, String)>>,
    edits: Mutex<Vec<(u64, String)>>,
    history: Mutex<Vec<RecentMessage>>,
    missing: Mutex<HashSet<u64>>,
}

impl MockChatApi {
    fn seed_history(&self, message: RecentMessage) {
        self.history.lock().unwrap().insert(0, message);
    }

    fn mark_missing(&self, id: u64) {
        self.missing.lock().unwrap().insert(id);
        self.history.lock().unwrap().retain(|m| m.id.get() != id);
    }

    fn sends(&self) -> Vec<(u64, String)> {
        self.sends.lock().unwrap().clone()
    }

    fn edits(&self) -> Vec<(u64, String)> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn channel_exists(&self, _channel: Id<ChannelMarker>) -> bool {
        true
    }

    async fn send_panel(
        &self,
        _channel: Id<ChannelMarker>,
        panel: &Panel,
    ) -> Result<Id<MessageMarker>, Error> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.sends.lock().unwrap().push((id, panel.title.clone()));
        self.seed_history(RecentMessage {
            id: Id::new(id),
            from_self: true,
            embed_title: Some(panel.title.clone()),
        });
        Ok(Id::new(id))
    }

    async fn edit_panel(
        &self,
        _channel: Id<ChannelMarker>,
        message: Id<MessageMarker>,
        panel: &Panel,
    ) -> Result<EditOutcome, Error> {
        if self.missing.lock().unwrap().contains(&message.get()) {
            return Ok(EditOutcome::Missing);
        }
        self.edits.lock().unwrap().push((message.get(), panel.title.clone()));
        Ok(EditOutcome::Updated)
    }

    async fn recent_messages(
        &self,
        _channel: Id<ChannelMarker>,
        limit: u16,
    ) -> Result<Vec<RecentMessage>, Error> {
        let history = self.history.lock().unwrap();
        Ok(history.iter().take(limit as usize).cloned().collect())
    }

    async fn send_text(&self, _channel: Id<ChannelMarker>, _text: &str) -> Result<(), Error> {
        Ok(())
    }
}

struct HealthyQuery;

#[async_trait]
impl ServerQuery for HealthyQuery {
    async fn status(&self, _host: &str, _port: u16) -> Result<QueryResponse, Error> {
        Ok(QueryResponse {
            latency_ms: 12,
            players_online: 1,
            players_max: 10,
            sample: vec!["Alice".into()],
            description: "A Minecraft Server".into(),
        })
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

fn reconciler(api: Arc<MockChatApi>, servers: Vec<ServerConfig>) -> Reconciler {
    Reconciler::new(
        api,
        Arc::new(HealthyQuery),
        Id::new(500),
        servers,
        20,
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn repeated_ticks_edit_the_same_message() {
    let api = Arc::new(MockChatApi::default());
    let mut reconciler = reconciler(api.clone(), vec![server_config("VANILLA")]);

    for _ in 0..3 {
        reconciler.tick().await;
    }

    let sends = api.sends();
    let edits = api.edits();
    assert_eq!(sends.len(), 1, "exactly one panel message per server");
    assert_eq!(edits.len(), 2, "every later tick edits in place");
    let bound = sends[0].0;
    assert!(edits.iter().all(|(id, _)| *id == bound));
}

#[tokio::test]
async fn each_server_gets_its_own_panel() {
    let api = Arc::new(MockChatApi::default());
    let mut reconciler = reconciler(
        api.clone(),
        vec![server_config("VANILLA"), server_config("MODDED")],
    );

    reconciler.tick().await;
    reconciler.tick().await;

    let sends = api.sends();
    assert_eq!(sends.len(), 2);
    let titles: Vec<&str> = sends.iter().map(|(_, t)| t.as_str()).collect();
    assert!(titles.contains(&"VANILLA Status"));
    assert!(titles.contains(&"MODDED Status"));
    assert_eq!(api.edits().len(), 2);
}

#[tokio::test]
async fn adopts_an_existing_panel_instead_of_duplicating() {
    let api = Arc::new(MockChatApi::default());
    // Decoys the scan has to skip: a foreign message and an unrelated embed.
    api.seed_history(RecentMessage {
        id: Id::new(7),
        from_self: true,
        embed_title: Some("VANILLA Status".into()),
    });
    api.seed_history(RecentMessage {
        id: Id::new(8),
        from_self: true,
        embed_title: Some("Weekly event announcement".into()),
    });
    api.seed_history(RecentMessage {
        id: Id::new(9),
        from_self: false,
        embed_title: Some("VANILLA Status".into()),
    });

    let mut reconciler = reconciler(api.clone(), vec![server_config("VANILLA")]);
    reconciler.tick().await;
    reconciler.tick().await;

    assert!(api.sends().is_empty(), "no new panel when one can be adopted");
    let edits = api.edits();
    assert_eq!(edits.len(), 2);
    assert!(edits.iter().all(|(id, _)| *id == 7), "both ticks hit the adopted message");
}

#[tokio::test]
async fn recreates_when_the_bound_message_vanishes() {
    let api = Arc::new(MockChatApi::default());
    let mut reconciler = reconciler(api.clone(), vec![server_config("VANILLA")]);

    reconciler.tick().await;
    let first = api.sends()[0].0;

    // Someone deletes the panel between ticks.
    api.mark_missing(first);
    reconciler.tick().await;

    let sends = api.sends();
    assert_eq!(sends.len(), 2, "a replacement panel is created");
    let second = sends[1].0;
    assert_ne!(first, second);

    // And the replacement is the new binding.
    reconciler.tick().await;
    let edits = api.edits();
    assert_eq!(edits.last().unwrap().0, second);
}
