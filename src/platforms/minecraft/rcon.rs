// src/platforms/minecraft/rcon.rs

use async_trait::async_trait;
use rcon::Connection;
use tokio::net::TcpStream;

use crate::Error;

#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn dispatch(&self, command: &str) -> Result<(), Error>;
}

/// Opens a fresh RCON connection per command and drops it right after the
/// single command. No pooling, no persistent session state.
pub struct OneShotRcon {
    address: String,
    password: String,
}

impl OneShotRcon {
    pub fn new(host: &str, port: u16, password: String) -> Self {
        Self {
            address: format!("{host}:{port}"),
            password,
        }
    }
}

#[async_trait]
impl CommandSink for OneShotRcon {
    async fn dispatch(&self, command: &str) -> Result<(), Error> {
        let mut conn = <Connection<TcpStream>>::builder()
            .enable_minecraft_quirks(true)
            .connect(&self.address, &self.password)
            .await?;
        conn.cmd(command).await?;
        Ok(())
    }
}
