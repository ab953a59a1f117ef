//! One client's connection: a reader task feeding inbound messages and a
//! writer task draining the outbound queue.
//!
//! Hitting EOF on the read side only ends the inbound sequence. The writer
//! keeps running so replies to the last lines still reach a half-closed
//! client, and stops once [`SessionHandle::close`] has been called and the
//! queue is drained. A failed write takes the reader down with it.

use tokio::{
    io::{AsyncBufRead, AsyncWrite},
    select,
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::message::{Message, read_line, write_line};

pub type SessionId = u64;

/// Cheap, cloneable address of a session's outbound queue.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    outbound: mpsc::UnboundedSender<String>,
    closing: CancellationToken,
}

impl SessionHandle {
    pub fn new(id: SessionId, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id,
            outbound,
            closing: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queues a line for the writer task. Never blocks; lines for a session
    /// whose writer is gone are dropped.
    pub fn send(&self, line: impl Into<String>) {
        if self.outbound.send(line.into()).is_err() {
            debug!(session = self.id, "dropping line for closed session");
        }
    }

    /// Asks the writer to flush what is already queued and hang up.
    pub fn close(&self) {
        self.closing.cancel();
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

/// Lazy sequence of lines read from a session. Ends for good once the
/// client stops sending.
#[derive(Debug)]
pub struct Inbound {
    id: SessionId,
    messages: mpsc::UnboundedReceiver<Message>,
}

impl Inbound {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub async fn next(&mut self) -> Option<Message> {
        self.messages.recv().await
    }
}

/// Starts the reader and writer tasks for a connection.
pub fn spawn<R, W>(id: SessionId, reader: R, writer: W) -> (SessionHandle, Inbound)
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let write_failed = CancellationToken::new();

    let handle = SessionHandle::new(id, outbound_tx);
    tokio::spawn(read_loop(
        handle.clone(),
        reader,
        inbound_tx,
        write_failed.clone(),
    ));
    tokio::spawn(write_loop(
        id,
        writer,
        outbound_rx,
        handle.closing.clone(),
        write_failed,
    ));

    let inbound = Inbound {
        id,
        messages: inbound_rx,
    };
    (handle, inbound)
}

async fn read_loop<R>(
    handle: SessionHandle,
    mut reader: R,
    inbound: mpsc::UnboundedSender<Message>,
    write_failed: CancellationToken,
) where
    R: AsyncBufRead + Unpin,
{
    loop {
        let line = select! {
            _ = write_failed.cancelled() => break,
            line = read_line(&mut reader) => line,
        };

        match line {
            Ok(Some(text)) => {
                if inbound.send(Message::new(handle.clone(), text)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                debug!(session = handle.id(), "peer closed the connection");
                break;
            }
            Err(error) => {
                debug!(session = handle.id(), ?error, "read failed");
                break;
            }
        }
    }
}

async fn write_loop<W>(
    id: SessionId,
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<String>,
    closing: CancellationToken,
    write_failed: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    // Exiting for any reason stops the reader too.
    let _guard = write_failed.drop_guard();

    loop {
        let line = select! {
            _ = closing.cancelled() => {
                flush_remaining(id, &mut writer, &mut outbound).await;
                break;
            }
            line = outbound.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };

        if let Err(error) = write_line(&mut writer, &line).await {
            debug!(session = id, ?error, "write failed");
            break;
        }
    }
}

async fn flush_remaining<W>(
    id: SessionId,
    writer: &mut W,
    outbound: &mut mpsc::UnboundedReceiver<String>,
) where
    W: AsyncWrite + Unpin,
{
    while let Ok(line) = outbound.try_recv() {
        if let Err(error) = write_line(writer, &line).await {
            debug!(session = id, ?error, "write failed while closing");
            return;
        }
    }
    debug!(session = id, "session closed");
}
