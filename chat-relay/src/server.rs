use std::{future::Future, net::SocketAddr};

use anyhow::Result;
use tokio::{
    io::BufReader,
    net::{TcpListener, TcpStream},
    select,
};
use tracing::{info, warn};

use crate::{
    dispatcher::{Dispatcher, Mailbox},
    session::{self, SessionId},
};

pub const DEFAULT_ROOM: &str = "home";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Room every new connection is placed in.
    pub default_room: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_room: DEFAULT_ROOM.to_string(),
        }
    }
}

/// Accept loop. Owns the listener and hands every connection to the dispatcher.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
}

impl Server {
    pub fn new(listener: TcpListener, config: ServerConfig) -> Self {
        Self { listener, config }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Server { listener, config } = self;
        let (dispatcher, mailbox) = Dispatcher::new(config.default_room);
        let dispatcher = tokio::spawn(dispatcher.run());
        tokio::pin!(shutdown);

        let mut next_id: SessionId = 1;
        loop {
            select! {
                _ = &mut shutdown => {
                    info!("chat server shutting down");
                    break;
                }
                accept_result = listener.accept() => {
                    if handle_accept_result(accept_result, next_id, &mailbox)? {
                        next_id += 1;
                    }
                }
            }
        }

        drop(mailbox);
        dispatcher.await?;
        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

fn handle_accept_result(
    result: std::io::Result<(TcpStream, SocketAddr)>,
    id: SessionId,
    mailbox: &Mailbox,
) -> Result<bool> {
    match result {
        Ok((stream, peer)) => {
            open_session(stream, peer, id, mailbox)?;
            Ok(true)
        }
        Err(err) => {
            warn!(error = ?err, "failed to accept connection");
            Ok(false)
        }
    }
}

fn open_session(
    stream: TcpStream,
    peer: SocketAddr,
    id: SessionId,
    mailbox: &Mailbox,
) -> Result<()> {
    let (reader, writer) = stream.into_split();
    let (handle, inbound) = session::spawn(id, BufReader::new(reader), writer);

    info!(%peer, session = id, "client connected");
    mailbox.join(handle, inbound)
}
