//! Prefix-matched bot commands.
//!
//! A PRIVMSG such as `mybot: !seen alice` (or just `!seen alice`) is
//! matched against the registered prefixes; the longest match wins, and its
//! handler receives the line with the address and prefix removed from the
//! text (`alice`).

use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use slirc_proto::Line;

use super::handler::Handler;
use super::set::{Node, Remover, spawn_guarded};
use crate::Client;
use crate::config::RecoverFn;

/// Separators allowed between our nick and a command.
const ADDRESS_SEPARATORS: [char; 5] = [':', ';', '>', ',', '-'];

type Commands = BTreeMap<String, Node>;

pub(crate) struct CommandRouter {
    commands: Arc<RwLock<Commands>>,
}

impl CommandRouter {
    pub(crate) fn new() -> Self {
        Self {
            commands: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Bind `prefix` (matched case-insensitively). A later registration of
    /// the same prefix replaces the earlier one.
    pub(crate) fn add(
        &self,
        prefix: &str,
        handler: Arc<dyn Handler>,
        location: &'static Location<'static>,
    ) -> Remover {
        let key = prefix.to_ascii_lowercase();
        self.commands
            .write()
            .insert(key.clone(), Node { handler, location });

        let commands: Weak<RwLock<Commands>> = Arc::downgrade(&self.commands);
        Remover::new(move || {
            if let Some(commands) = commands.upgrade() {
                commands.write().remove(&key);
            }
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// The longest registered prefix of `text` and its handler.
    fn find(&self, text: &str) -> Option<(usize, Node)> {
        let lower = text.to_ascii_lowercase();
        self.commands
            .read()
            .iter()
            .filter(|(prefix, _)| lower.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, node)| (prefix.len(), node.clone()))
    }

    /// Run the command matching a PRIVMSG, if any, and wait for it.
    /// Returns false when nothing matched.
    pub(crate) async fn route(
        &self,
        client: &Client,
        line: &Line,
        my_nick: &str,
        recover: Option<&RecoverFn>,
    ) -> bool {
        let text = strip_address(line.text(), my_nick);
        let Some((len, node)) = self.find(text) else {
            return false;
        };
        let rest = text[len..].trim();
        let line = line.with_text(rest);
        let verb = line.verb().to_ascii_lowercase();
        // Panics are already reported by the guard.
        let _ = spawn_guarded(node, &verb, client.clone(), line, recover.cloned()).await;
        true
    }
}

/// Remove a leading `<nick>[:;>,-] ` address from `text`.
fn strip_address<'a>(text: &'a str, nick: &str) -> &'a str {
    let Some(rest) = text.strip_prefix(nick) else {
        return text;
    };
    let rest = rest.strip_prefix(ADDRESS_SEPARATORS).unwrap_or(rest);
    match rest.strip_prefix(' ') {
        Some(rest) => rest.trim_start(),
        None => text,
    }
}
