//! Line protocol: the command vocabulary and the fixed notices the server sends.

use crate::{
    message::{normalize, strip_bracket_suffix},
    session::SessionId,
};

pub const WHO_AM_I: &str = "whoAmI";
pub const USER_LIST: &str = "userList";
pub const SEND_MESSAGE: &str = "sendMessage";
pub const SEND_TO_USERS: &str = "sendToUsers";
pub const HELP: &str = "help";

pub const JOINED_SERVER: &str = "successfully joined the chat server\n";
pub const UNKNOWN_COMMAND: &str = "unknown command\n";

pub const HELP_LINES: &[&str] = &[
    "\nAvailable Commands:\n",
    "whoAmI - sends the client's self identity\n",
    "userList - lists the connected clients(ID)\n",
    "sendMessage - sends messages to all the clients\n",
    "sendToUsers - sends messages to the client with provided IDs\n",
    "help - lists all the available commands\n",
    "\n",
];

pub fn room_created(name: &str) -> String {
    format!("{name} chat room created\n")
}

pub fn joined_chat(id: SessionId) -> String {
    format!("{id} joined the chat\n")
}

pub fn identity(id: SessionId) -> String {
    format!("whoAmI? My ID {id}\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    WhoAmI,
    UserList,
    SendMessage { text: String },
    SendToUsers { targets: Vec<String>, text: String },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand;

impl Command {
    /// Matches the line against the vocabulary by prefix, so `whoAmI please`
    /// is still `whoAmI`.
    pub fn parse(line: &str) -> Result<Self, UnknownCommand> {
        if line.starts_with(WHO_AM_I) {
            Ok(Command::WhoAmI)
        } else if line.starts_with(USER_LIST) {
            Ok(Command::UserList)
        } else if line.starts_with(SEND_MESSAGE) {
            Ok(Command::SendMessage {
                text: normalize(line).to_string(),
            })
        } else if line.starts_with(SEND_TO_USERS) {
            Ok(parse_send_to_users(&line[SEND_TO_USERS.len()..]))
        } else if line.starts_with(HELP) {
            Ok(Command::Help)
        } else {
            Err(UnknownCommand)
        }
    }
}

// `sendToUsers 7,9 some text`: the first token lists targets, the rest is the body.
fn parse_send_to_users(rest: &str) -> Command {
    let rest = rest.trim_start();
    let (targets, text) = match rest.split_once(char::is_whitespace) {
        Some((targets, text)) => (targets, text),
        None => (rest, ""),
    };

    let targets = targets
        .split(',')
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .map(str::to_string)
        .collect();

    Command::SendToUsers {
        targets,
        text: strip_bracket_suffix(text).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands_by_prefix() {
        assert_eq!(Command::parse("whoAmI"), Ok(Command::WhoAmI));
        assert_eq!(Command::parse("whoAmI now"), Ok(Command::WhoAmI));
        assert_eq!(Command::parse("userList"), Ok(Command::UserList));
        assert_eq!(Command::parse("help"), Ok(Command::Help));
        assert_eq!(Command::parse("helpme"), Ok(Command::Help));
    }

    #[test]
    fn send_message_payload_is_normalized() {
        assert_eq!(
            Command::parse("sendMessage  hello world [bot]"),
            Ok(Command::SendMessage {
                text: "hello world".into()
            })
        );
    }

    #[test]
    fn send_to_users_splits_targets_and_body() {
        assert_eq!(
            Command::parse("sendToUsers 7,9 ping"),
            Ok(Command::SendToUsers {
                targets: vec!["7".into(), "9".into()],
                text: "ping".into(),
            })
        );
    }

    #[test]
    fn send_to_users_skips_blank_targets() {
        assert_eq!(
            Command::parse("sendToUsers 3,,4, hi there"),
            Ok(Command::SendToUsers {
                targets: vec!["3".into(), "4".into()],
                text: "hi there".into(),
            })
        );
        assert_eq!(
            Command::parse("sendToUsers"),
            Ok(Command::SendToUsers {
                targets: vec![],
                text: String::new(),
            })
        );
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(Command::parse("foo"), Err(UnknownCommand));
        assert_eq!(Command::parse(""), Err(UnknownCommand));
        assert_eq!(Command::parse(" whoAmI"), Err(UnknownCommand));
        assert_eq!(Command::parse("WHOAMI"), Err(UnknownCommand));
    }

    #[test]
    fn help_block_lists_every_command() {
        let help: String = HELP_LINES.concat();
        for token in [WHO_AM_I, USER_LIST, SEND_MESSAGE, SEND_TO_USERS, HELP] {
            assert!(help.contains(token), "help text is missing {token}");
        }
    }
}
