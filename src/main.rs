use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::time;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use twilight_model::id::Id;

use craftlink::Error;
use craftlink::config::Config;
use craftlink::logtail::tail::LogTail;
use craftlink::platforms::discord::ChatApi;
use craftlink::platforms::discord::runtime::DiscordPlatform;
use craftlink::platforms::minecraft::query::SlpQuery;
use craftlink::platforms::minecraft::rcon::OneShotRcon;
use craftlink::relay::ChatRelay;
use craftlink::status::reconciler::Reconciler;
use craftlink::tasks::{
    LogTailSettings, spawn_inbound_relay_task, spawn_log_tail_task, spawn_status_panel_task,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "craftlink")]
#[command(author, version, about = "Discord <-> Minecraft bridge: status panels plus two-way chat relay")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "craftlink.json")]
    config: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("craftlink=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("craftlink failed to start: {e:?}");
        return Err(Box::new(e) as Box<dyn std::error::Error>);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run(args: Args) -> Result<(), Error> {
    let config = Config::load(&args.config)?;
    let token = Config::discord_token()?;

    // Both loops need a ready gateway and a resolved channel handle, so the
    // whole startup sequence waits here first.
    let mut platform = DiscordPlatform::new(token);
    platform.connect().await?;
    let self_id = platform.wait_until_ready().await?;
    let api = Arc::new(platform.api(self_id)?);
    let platform = Arc::new(platform);

    info!("logged in (user id {self_id}); monitoring {} server(s):", config.servers.len());
    for server in &config.servers {
        info!(
            "- {}: {}:{} (icon: {})",
            server.name,
            server.host,
            server.port,
            server.icon_path.display()
        );
    }
    info!("status panels -> channel {}", config.status_channel_id);

    let query = Arc::new(SlpQuery);

    let status_channel = Id::new(config.status_channel_id);
    let reconciler = Reconciler::new(
        api.clone(),
        query.clone(),
        status_channel,
        config.servers.clone(),
        config.history_scan_limit,
        Duration::from_secs(config.query_timeout_secs),
    );
    let _status_handle =
        spawn_status_panel_task(reconciler, Duration::from_secs(config.poll_interval_secs));

    let relay_channel = Id::new(config.relay.channel_id);
    let sink = Arc::new(OneShotRcon::new(
        &config.relay.rcon.host,
        config.relay.rcon.port,
        config.rcon_password(),
    ));
    let relay = Arc::new(ChatRelay::new(api.clone(), sink, relay_channel));

    let _inbound_handle = spawn_inbound_relay_task(platform.clone(), relay.clone());

    if !api.channel_exists(relay_channel).await {
        warn!("chat relay channel {relay_channel} is not reachable; log relay disabled");
    } else {
        match config.servers.iter().find(|s| s.name == config.relay.server) {
            Some(server) => {
                let settings = LogTailSettings {
                    host: server.host.clone(),
                    port: server.port,
                    poll_interval: Duration::from_secs(config.tail_interval_secs),
                    offline_backoff: Duration::from_secs(config.offline_backoff_secs),
                    query_timeout: Duration::from_secs(config.query_timeout_secs),
                };
                let tail = LogTail::new(config.relay.log_file.clone());
                let _tail_handle = spawn_log_tail_task(tail, relay.clone(), query.clone(), settings);
                info!(
                    "chat relay -> channel {relay_channel}, tailing {}",
                    config.relay.log_file.display()
                );
            }
            None => warn!(
                "relay server '{}' is not in the monitored server list; log relay disabled",
                config.relay.server
            ),
        }
    }

    // Run until Ctrl-C.
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e:?}");
        }
        info!("Ctrl-C received; shutting down");
        let _ = shutdown_tx.send(true);
    });

    loop {
        tokio::select! {
            _ = time::sleep(Duration::from_secs(10)) => {}
            Ok(_) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    Ok(())
}
