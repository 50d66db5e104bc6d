pub mod api;
pub mod runtime;

pub use api::{ChatApi, DiscordApi, EditOutcome, RecentMessage};
pub use runtime::{DiscordPlatform, InboundMessage};
