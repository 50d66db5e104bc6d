// src/tasks/status_panel.rs

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::status::reconciler::Reconciler;

/// Drives the status panel reconciler on a fixed period. The first pass runs
/// immediately so panels appear as soon as the gateway is ready. Faults are
/// handled inside `tick`, so the loop itself never exits.
pub fn spawn_status_panel_task(mut reconciler: Reconciler, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            reconciler.tick().await;
        }
    })
}
