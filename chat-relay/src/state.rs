use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{
    command::{JOINED_SERVER, room_created},
    room::Room,
    session::{SessionHandle, SessionId},
};

/// Everything the dispatcher owns: rooms by name, every session that ever
/// joined, and which room each session belongs to.
///
/// Nothing is removed when a session disconnects. Lines sent to a dead
/// session are dropped by its handle.
#[derive(Debug, Default)]
pub struct ChatState {
    rooms: HashMap<String, Room>,
    sessions: Vec<SessionHandle>,
    memberships: HashMap<SessionId, String>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn sessions(&self) -> &[SessionHandle] {
        &self.sessions
    }

    /// Creates `name` if it does not exist yet and tells the creator.
    pub fn create_room(&mut self, session: &SessionHandle, name: &str) {
        if self.rooms.contains_key(name) {
            debug!(session = session.id(), room = name, "room already exists");
            return;
        }

        self.rooms.insert(name.to_string(), Room::new(name));
        session.send(room_created(name));
        info!(session = session.id(), room = name, "chat room created");
    }

    /// Puts the session into an existing room. The room must have been created first.
    pub fn join_room(&mut self, session: &SessionHandle, name: &str) {
        let Some(room) = self.rooms.get_mut(name) else {
            warn!(session = session.id(), room = name, "join requested for missing room");
            return;
        };

        self.memberships.insert(session.id(), name.to_string());
        room.join(session.clone());
        info!(session = session.id(), room = name, "session joined chat room");
    }

    pub fn register_session(&mut self, session: SessionHandle) {
        session.send(JOINED_SERVER);
        self.sessions.push(session);
    }

    /// The room `session` belongs to, if it has joined one.
    pub fn room_of(&mut self, session: &SessionHandle) -> Option<&mut Room> {
        let name = self.memberships.get(&session.id())?;
        self.rooms.get_mut(name)
    }
}
