//! The single task that owns [`ChatState`].
//!
//! Sessions never touch rooms directly. New connections arrive as join
//! events through a [`Mailbox`], and every inbound line is relayed by a
//! per-session forwarding task into the dispatcher's message queue. Both
//! queues are drained by one loop, so room membership and history are only
//! ever mutated from one place.
//!
//! When a client stops sending, its forwarder posts a final closed event
//! behind its last line. The dispatcher answers that by closing the session,
//! which flushes every reply queued before it.

use anyhow::{Result, anyhow};
use tokio::{select, sync::mpsc};
use tracing::{debug, info};

use crate::{
    command::{Command, UnknownCommand},
    handlers,
    message::Message,
    session::{Inbound, SessionHandle},
    state::ChatState,
};

struct JoinEvent {
    session: SessionHandle,
    inbound: Inbound,
}

enum SessionEvent {
    Line(Message),
    Closed(SessionHandle),
}

/// Sending side of the dispatcher's join queue.
#[derive(Clone)]
pub struct Mailbox {
    joins: mpsc::UnboundedSender<JoinEvent>,
}

impl Mailbox {
    pub fn join(&self, session: SessionHandle, inbound: Inbound) -> Result<()> {
        self.joins
            .send(JoinEvent { session, inbound })
            .map_err(|_| anyhow!("dispatcher has stopped"))
    }
}

pub struct Dispatcher {
    state: ChatState,
    default_room: String,
    joins: mpsc::UnboundedReceiver<JoinEvent>,
    messages_tx: mpsc::UnboundedSender<SessionEvent>,
    messages_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Dispatcher {
    pub fn new(default_room: impl Into<String>) -> (Self, Mailbox) {
        let (joins_tx, joins_rx) = mpsc::unbounded_channel();
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();

        let dispatcher = Self {
            state: ChatState::new(),
            default_room: default_room.into(),
            joins: joins_rx,
            messages_tx,
            messages_rx,
        };
        (dispatcher, Mailbox { joins: joins_tx })
    }

    /// Processes events until every [`Mailbox`] has been dropped.
    pub async fn run(mut self) {
        loop {
            select! {
                join = self.joins.recv() => match join {
                    Some(event) => self.handle_join(event),
                    None => break,
                },
                Some(event) = self.messages_rx.recv() => match event {
                    SessionEvent::Line(message) => self.handle_message(message),
                    SessionEvent::Closed(session) => {
                        debug!(session = session.id(), "client stopped sending");
                        session.close();
                    }
                },
            }
        }

        info!(
            sessions = self.state.sessions().len(),
            "dispatcher stopped"
        );
    }

    fn handle_join(&mut self, event: JoinEvent) {
        let JoinEvent { session, inbound } = event;
        let room = self.default_room.as_str();

        self.state.create_room(&session, room);
        self.state.join_room(&session, room);
        self.state.register_session(session.clone());

        spawn_forwarder(session, inbound, self.messages_tx.clone());
    }

    fn handle_message(&mut self, message: Message) {
        let sender = message.sender();
        debug!(
            session = sender.id(),
            received_at = %message.received_at(),
            text = message.text(),
            "dispatching message"
        );

        let state = &mut self.state;
        match Command::parse(message.text()) {
            Ok(Command::WhoAmI) => handlers::who_am_i(state, sender),
            Ok(Command::UserList) => handlers::user_list(state, sender),
            Ok(Command::SendMessage { text }) => handlers::send_message(state, sender, &text),
            Ok(Command::SendToUsers { targets, text }) => {
                handlers::send_to_users(state, sender, &targets, &text)
            }
            Ok(Command::Help) => handlers::help(state, sender),
            Err(UnknownCommand) => handlers::unknown_command(sender),
        }
    }
}

fn spawn_forwarder(
    session: SessionHandle,
    mut inbound: Inbound,
    messages: mpsc::UnboundedSender<SessionEvent>,
) {
    tokio::spawn(async move {
        while let Some(message) = inbound.next().await {
            if messages.send(SessionEvent::Line(message)).is_err() {
                return;
            }
        }
        debug!(session = inbound.id(), "forwarder finished");
        let _ = messages.send(SessionEvent::Closed(session));
    });
}
