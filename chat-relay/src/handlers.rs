//! Side effects for each command. Commands from a session that has not
//! joined a room are dropped.

use tracing::debug;

use crate::{
    command::{HELP_LINES, UNKNOWN_COMMAND},
    message::chat_line,
    room::Room,
    session::SessionHandle,
    state::ChatState,
};

pub fn who_am_i(state: &mut ChatState, sender: &SessionHandle) {
    if let Some(room) = member_room(state, sender, "whoAmI") {
        room.identity(sender);
    }
}

pub fn user_list(state: &mut ChatState, sender: &SessionHandle) {
    if let Some(room) = member_room(state, sender, "userList") {
        room.list_members(sender);
    }
}

pub fn send_message(state: &mut ChatState, sender: &SessionHandle, text: &str) {
    if let Some(room) = member_room(state, sender, "sendMessage") {
        room.broadcast(chat_line(sender.id(), text));
    }
}

pub fn send_to_users(
    state: &mut ChatState,
    sender: &SessionHandle,
    targets: &[String],
    text: &str,
) {
    if let Some(room) = member_room(state, sender, "sendToUsers") {
        debug!(session = sender.id(), ?targets, "targeted send");
        room.deliver_to(&chat_line(sender.id(), text), targets);
    }
}

pub fn help(state: &mut ChatState, sender: &SessionHandle) {
    if member_room(state, sender, "help").is_some() {
        for line in HELP_LINES {
            sender.send(*line);
        }
    }
}

pub fn unknown_command(sender: &SessionHandle) {
    sender.send(UNKNOWN_COMMAND);
}

fn member_room<'a>(
    state: &'a mut ChatState,
    sender: &SessionHandle,
    command: &str,
) -> Option<&'a mut Room> {
    let room = state.room_of(sender);
    if room.is_none() {
        debug!(session = sender.id(), command, "ignoring command from session outside any room");
    }
    room
}
