pub mod inbound_relay;
pub mod log_tail;
pub mod status_panel;

pub use inbound_relay::spawn_inbound_relay_task;
pub use log_tail::{LogTailSettings, spawn_log_tail_task};
pub use status_panel::spawn_status_panel_task;
