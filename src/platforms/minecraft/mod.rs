pub mod query;
pub mod rcon;

pub use query::{QueryResponse, ServerQuery, SlpQuery};
pub use rcon::{CommandSink, OneShotRcon};
