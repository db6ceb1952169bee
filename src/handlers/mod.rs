//! The client's own handlers.
//!
//! These run in the internal phase, so by the time a user handler sees a
//! line the client has already answered it and the tracker reflects it.
//!
//! - [`builtin`]: registration, keepalive replies, CTCP and nick collisions.
//!   Registered once per client and never removed.
//! - [`tracking`]: room and member bookkeeping. Registered and removed as
//!   a group by [`Client::enable_state_tracking`] and
//!   [`Client::disable_state_tracking`].

mod builtin;
mod tracking;

use slirc_proto::command::verbs;

use crate::connection::Client;
use crate::dispatch::Remover;

use self::builtin::{
    CommandHandler, CtcpHandler, NickHandler, NickInUseHandler, PingHandler, RegisterHandler,
    WelcomeHandler,
};
use self::tracking::{
    ChannelModeIsHandler, JoinHandler, KickHandler, ModeHandler, NamesReplyHandler,
    NickChangeHandler, PartHandler, QuitHandler, TopicHandler, WhoReplyHandler,
    WhoisSecureHandler, WhoisUserHandler,
};

/// Register the permanent handlers.
pub(crate) fn register_core(client: &Client) {
    let _ = client.handle_internal(verbs::REGISTER, RegisterHandler);
    let _ = client.handle_internal(verbs::RPL_WELCOME, WelcomeHandler);
    let _ = client.handle_internal(verbs::ERR_NICKNAMEINUSE, NickInUseHandler);
    let _ = client.handle_internal(verbs::PING, PingHandler);
    let _ = client.handle_internal(verbs::CTCP, CtcpHandler);
    let _ = client.handle_internal(verbs::NICK, NickHandler);
    let _ = client.handle_internal(verbs::PRIVMSG, CommandHandler);
}

/// Register the tracking handlers, returning their removal tokens.
pub(crate) fn register_tracking(client: &Client) -> Vec<Remover> {
    vec![
        client.handle_internal(verbs::JOIN, JoinHandler),
        client.handle_internal(verbs::PART, PartHandler),
        client.handle_internal(verbs::KICK, KickHandler),
        client.handle_internal(verbs::QUIT, QuitHandler),
        client.handle_internal(verbs::NICK, NickChangeHandler),
        client.handle_internal(verbs::MODE, ModeHandler),
        client.handle_internal(verbs::TOPIC, TopicHandler),
        client.handle_internal(verbs::RPL_TOPIC, TopicHandler),
        client.handle_internal(verbs::RPL_WHOISUSER, WhoisUserHandler),
        client.handle_internal(verbs::RPL_CHANNELMODEIS, ChannelModeIsHandler),
        client.handle_internal(verbs::RPL_WHOREPLY, WhoReplyHandler),
        client.handle_internal(verbs::RPL_NAMREPLY, NamesReplyHandler),
        client.handle_internal(verbs::RPL_WHOISSECURE, WhoisSecureHandler),
    ]
}
