use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use crate::server::{DEFAULT_ROOM, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the chat server.
    Server(ServerArgs),
    /// Connect a terminal to a running chat server.
    Client(ClientArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Socket address to listen on. Use port 0 for an ephemeral port.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Room every client joins on connect.
    #[arg(long, default_value = DEFAULT_ROOM)]
    pub room: String,
}

impl ServerArgs {
    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            default_room: self.room.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Address of the chat server.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub server: SocketAddr,
}
