//! Line-oriented multi-client chat relay.
//!
//! Clients connect over TCP, land in a default room, and type commands such
//! as `sendMessage hi` or `userList`. The server side is split so that shared
//! chat state has exactly one owner:
//!
//! - [`server`] accepts connections and wraps each one in a session.
//! - [`session`] runs the reader and writer tasks for one connection.
//! - [`dispatcher`] owns all rooms and processes join and message events one
//!   at a time.
//! - [`command`] parses lines into [`command::Command`] values and holds the
//!   fixed notices; [`handlers`] carries out each command.
//! - [`room`] and [`state`] hold membership, history and the room registry.
//! - [`message`] is the inbound message type plus line framing helpers.
//! - [`cli`] and [`client`] provide the `server`/`client` binary modes.

pub mod cli;
pub mod client;
pub mod command;
pub mod dispatcher;
pub mod handlers;
pub mod message;
pub mod room;
pub mod server;
pub mod session;
pub mod state;
