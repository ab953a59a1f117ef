use tracing::debug;

use crate::{
    command::{identity, joined_chat},
    session::SessionHandle,
};

/// A named broadcast group. Members are kept in join order and every line
/// that goes out through the room is kept for replay to later joiners.
#[derive(Debug)]
pub struct Room {
    name: String,
    members: Vec<SessionHandle>,
    history: Vec<String>,
}

impl Room {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            history: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub(crate) fn members(&self) -> &[SessionHandle] {
        &self.members
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &[String] {
        &self.history
    }

    pub fn contains(&self, session: &SessionHandle) -> bool {
        self.members.iter().any(|member| member.id() == session.id())
    }

    /// Replays history to the newcomer, then announces them to everyone,
    /// newcomer included.
    pub fn join(&mut self, session: SessionHandle) {
        for line in &self.history {
            session.send(line.as_str());
        }

        let announcement = joined_chat(session.id());
        self.members.push(session);
        self.broadcast(announcement);
    }

    pub fn broadcast(&mut self, text: impl Into<String>) {
        let text = text.into();
        for member in &self.members {
            member.send(text.as_str());
        }
        self.history.push(text);
    }

    /// Sends `text` only to members whose id matches one of `targets`.
    ///
    /// Every delivery is also recorded in the shared history, so later
    /// joiners see lines the rest of the room never did.
    pub fn deliver_to(&mut self, text: &str, targets: &[String]) {
        for target in targets {
            for member in &self.members {
                if member.id().to_string() == *target {
                    self.history.push(text.to_string());
                    member.send(text);
                }
            }
        }
    }

    pub fn list_members(&self, requester: &SessionHandle) {
        if !self.contains(requester) {
            debug!(session = requester.id(), room = %self.name, "member list requested by outsider");
            return;
        }

        let ids = self
            .members
            .iter()
            .map(|member| member.id().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        requester.send(ids);
    }

    pub fn identity(&self, requester: &SessionHandle) {
        if !self.contains(requester) {
            debug!(session = requester.id(), room = %self.name, "identity requested by outsider");
            return;
        }

        requester.send(identity(requester.id()));
    }
}
