//! Registration, keepalive, CTCP and nick-collision handlers.

use async_trait::async_trait;
use slirc_proto::Line;
use slirc_proto::command::verbs;
use tracing::{debug, info};

use crate::connection::{Client, Phase};
use crate::dispatch::Handler;

/// Sends PASS (if configured), NICK and USER once the transport is up.
pub struct RegisterHandler;

#[async_trait]
impl Handler for RegisterHandler {
    async fn handle(&self, client: Client, _line: Line) {
        let me = client.me();
        if let Some(password) = &client.config().password {
            client.pass(password).await;
        }
        client.nick(&me.nick).await;
        client.user(&me.user, &me.realname).await;
    }
}

/// 001: registration is complete.
pub struct WelcomeHandler;

#[async_trait]
impl Handler for WelcomeHandler {
    async fn handle(&self, client: Client, line: Line) {
        client.set_phase(Phase::Ready);
        if let Some(host) = welcome_host(line.text()) {
            client.tracker().write().set_my_host(host);
        }
        info!(server = %line.raw_source(), nick = %client.my_nick(), "Registered");
        client
            .dispatch(Line::synthetic(verbs::CONNECTED, line.time()))
            .await;
    }
}

/// Our host as the server sees it, from the `nick!user@host` that ends
/// most welcome texts.
fn welcome_host(text: &str) -> Option<&str> {
    text.split_whitespace()
        .rev()
        .find(|token| token.contains('@'))
        .and_then(|token| token.rsplit_once('@'))
        .map(|(_, host)| host)
        .filter(|host| !host.is_empty())
}

/// 433: pick another nick and try again.
pub struct NickInUseHandler;

#[async_trait]
impl Handler for NickInUseHandler {
    async fn handle(&self, client: Client, line: Line) {
        // 433 <me> <nick> :Nickname is already in use
        let Some(taken) = line.arg(1) else {
            return;
        };
        let next = (client.hooks().new_nick)(taken);
        info!(taken = %taken, next = %next, "Nick in use, retrying");
        {
            let mut tracker = client.tracker().write();
            if tracker.is_me(taken) {
                tracker.rename_member(taken, &next);
            }
        }
        client.nick(&next).await;
    }
}

/// Answers server PINGs.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, client: Client, line: Line) {
        // PING <token>
        let token = line.arg(0).unwrap_or("");
        client.pong(token).await;
    }
}

/// Answers CTCP VERSION and PING.
pub struct CtcpHandler;

#[async_trait]
impl Handler for CtcpHandler {
    async fn handle(&self, client: Client, line: Line) {
        // Args: [sub-verb, target, body]
        match line.arg(0) {
            Some(verbs::VERSION) => {
                let version = &client.config().version;
                client
                    .ctcp_reply(line.nick(), verbs::VERSION, Some(version))
                    .await;
            }
            Some(verbs::PING) => {
                if let Some(body) = line.arg(2).filter(|body| !body.is_empty()) {
                    client.ctcp_reply(line.nick(), verbs::PING, Some(body)).await;
                }
            }
            _ => {}
        }
    }
}

/// Follows our own nick changes while state tracking is off.
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, client: Client, line: Line) {
        if client.is_tracking() {
            return;
        }
        let Some(new) = line.arg(0) else {
            return;
        };
        let mut tracker = client.tracker().write();
        if tracker.is_me(line.nick()) {
            tracker.rename_member(line.nick(), new);
        }
    }
}

/// Hands PRIVMSG lines to the command router.
pub struct CommandHandler;

#[async_trait]
impl Handler for CommandHandler {
    async fn handle(&self, client: Client, line: Line) {
        let dispatcher = client.dispatcher();
        let router = dispatcher.commands();
        if router.is_empty() {
            return;
        }
        let my_nick = client.my_nick();
        if router
            .route(&client, &line, &my_nick, dispatcher.recover())
            .await
        {
            debug!(source = %line.nick(), "Routed command");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_host() {
        assert_eq!(
            welcome_host("Welcome to IRC test!ident@host.example.com"),
            Some("host.example.com")
        );
        assert_eq!(welcome_host("Welcome to the network, test"), None);
        assert_eq!(welcome_host("Welcome test!ident@"), None);
    }
}
