//! Verb names used by the client.
//!
//! Besides wire verbs this includes the synthetic event verbs the client
//! dispatches itself (`REGISTER`, `CONNECTED`, `DISCONNECTED`) and the
//! verbs that inbound CTCP payloads are rewritten to (`ACTION`, `CTCP`,
//! `CTCPREPLY`).

#![allow(missing_docs)]

pub const REGISTER: &str = "REGISTER";
pub const CONNECTED: &str = "CONNECTED";
pub const DISCONNECTED: &str = "DISCONNECTED";
pub const ACTION: &str = "ACTION";
pub const AWAY: &str = "AWAY";
pub const CTCP: &str = "CTCP";
pub const CTCPREPLY: &str = "CTCPREPLY";
pub const INVITE: &str = "INVITE";
pub const JOIN: &str = "JOIN";
pub const KICK: &str = "KICK";
pub const MODE: &str = "MODE";
pub const NICK: &str = "NICK";
pub const NOTICE: &str = "NOTICE";
pub const OPER: &str = "OPER";
pub const PART: &str = "PART";
pub const PASS: &str = "PASS";
pub const PING: &str = "PING";
pub const PONG: &str = "PONG";
pub const PRIVMSG: &str = "PRIVMSG";
pub const QUIT: &str = "QUIT";
pub const TOPIC: &str = "TOPIC";
pub const USER: &str = "USER";
pub const VERSION: &str = "VERSION";
pub const VHOST: &str = "VHOST";
pub const WHO: &str = "WHO";
pub const WHOIS: &str = "WHOIS";

pub const RPL_WELCOME: &str = "001";
pub const RPL_WHOISUSER: &str = "311";
pub const RPL_CHANNELMODEIS: &str = "324";
pub const RPL_TOPIC: &str = "332";
pub const RPL_WHOREPLY: &str = "352";
pub const RPL_NAMREPLY: &str = "353";
pub const RPL_ENDOFNAMES: &str = "366";
pub const ERR_NICKNAMEINUSE: &str = "433";
pub const RPL_WHOISSECURE: &str = "671";
