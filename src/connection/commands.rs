//! Typed command helpers on [`Client`].
//!
//! Each helper builds one [`Command`] and queues it with [`Client::send`].

use slirc_proto::Command;

use super::Client;

impl Client {
    pub async fn pass(&self, password: &str) {
        self.send(Command::PASS(password.into())).await
    }

    pub async fn nick(&self, nick: &str) {
        self.send(Command::NICK(nick.into())).await
    }

    /// `USER ident 12 * :realname`
    pub async fn user(&self, ident: &str, realname: &str) {
        self.send(Command::USER(ident.into(), realname.into())).await
    }

    pub async fn join(&self, channel: &str) {
        self.send(Command::JOIN(channel.into(), None)).await
    }

    pub async fn join_with_key(&self, channel: &str, key: &str) {
        self.send(Command::JOIN(channel.into(), Some(key.into()))).await
    }

    pub async fn part(&self, channel: &str) {
        self.send(Command::PART(channel.into(), None)).await
    }

    pub async fn part_with_message(&self, channel: &str, message: &str) {
        self.send(Command::PART(channel.into(), Some(message.into())))
            .await
    }

    pub async fn kick(&self, channel: &str, nick: &str, reason: Option<&str>) {
        self.send(Command::KICK(
            channel.into(),
            nick.into(),
            reason.map(Into::into),
        ))
        .await
    }

    pub async fn whois(&self, nick: &str) {
        self.send(Command::WHOIS(nick.into())).await
    }

    pub async fn who(&self, target: &str) {
        self.send(Command::WHO(target.into())).await
    }

    /// Message `target`, split into several frames if long.
    pub async fn privmsg(&self, target: &str, text: &str) {
        self.send(Command::privmsg(target, text)).await
    }

    pub async fn notice(&self, target: &str, text: &str) {
        self.send(Command::notice(target, text)).await
    }

    /// CTCP request, e.g. `ctcp("nick", "PING", Some("12345"))`.
    pub async fn ctcp(&self, target: &str, sub: &str, body: Option<&str>) {
        self.send(Command::CTCP(target.into(), sub.into(), body.map(Into::into)))
            .await
    }

    pub async fn ctcp_reply(&self, target: &str, sub: &str, body: Option<&str>) {
        self.send(Command::CTCPREPLY(
            target.into(),
            sub.into(),
            body.map(Into::into),
        ))
        .await
    }

    pub async fn version(&self, target: &str) {
        self.send(Command::version(target)).await
    }

    /// `/me` towards `target`.
    pub async fn action(&self, target: &str, text: &str) {
        self.send(Command::action(target, text)).await
    }

    /// Ask for a channel's topic.
    pub async fn topic(&self, channel: &str) {
        self.send(Command::TOPIC(channel.into(), None)).await
    }

    pub async fn set_topic(&self, channel: &str, topic: &str) {
        self.send(Command::TOPIC(channel.into(), Some(topic.into())))
            .await
    }

    /// `MODE target [modes...]`; with no modes, asks for the current ones.
    pub async fn mode(&self, target: &str, modes: &[&str]) {
        self.send(Command::MODE(
            target.into(),
            modes.iter().map(|m| (*m).to_owned()).collect(),
        ))
        .await
    }

    pub async fn away(&self, message: &str) {
        self.send(Command::AWAY(Some(message.into()))).await
    }

    /// Clear away status.
    pub async fn back(&self) {
        self.send(Command::AWAY(None)).await
    }

    pub async fn invite(&self, nick: &str, channel: &str) {
        self.send(Command::INVITE(nick.into(), channel.into())).await
    }

    pub async fn oper(&self, user: &str, password: &str) {
        self.send(Command::OPER(user.into(), password.into())).await
    }

    pub async fn vhost(&self, user: &str, password: &str) {
        self.send(Command::VHOST(user.into(), password.into())).await
    }

    pub async fn ping(&self, payload: &str) {
        self.send(Command::PING(payload.into())).await
    }

    pub async fn pong(&self, payload: &str) {
        self.send(Command::PONG(payload.into())).await
    }

    /// Send a frame as-is, cut at its first CR or LF.
    pub async fn raw(&self, frame: &str) {
        self.send(Command::Raw(frame.into())).await
    }
}
