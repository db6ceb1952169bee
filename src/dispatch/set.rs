//! Ordered handler registries.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, Location};
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use parking_lot::RwLock;
use slirc_proto::Line;
use tokio::task::JoinHandle;
use tracing::error;

use super::handler::{Handler, HandlerPanic};
use crate::Client;
use crate::config::RecoverFn;

/// Detaches a registered handler.
///
/// Dropping the token leaves the handler registered; call
/// [`remove`](Remover::remove) to take it out.
#[must_use = "dropping a Remover keeps the handler registered; call remove() to detach it"]
pub struct Remover {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Remover {
    pub(crate) fn new(detach: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach the handler. Lines already being dispatched still reach it.
    pub fn remove(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Remover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remover")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// One registered handler.
#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) handler: Arc<dyn Handler>,
    pub(crate) location: &'static Location<'static>,
}

/// The handlers of one verb.
///
/// Removal only touches `nodes`. Ids of removed handlers stay in `order`
/// until the next insert finds it at least twice the live count.
#[derive(Default)]
struct Handlers {
    nodes: HashMap<u64, Node>,
    /// Ids in registration order, possibly stale.
    order: Vec<u64>,
}

impl Handlers {
    fn insert(&mut self, id: u64, node: Node) {
        if self.order.len() >= 2 * self.nodes.len().max(8) {
            let nodes = &self.nodes;
            self.order.retain(|id| nodes.contains_key(id));
        }
        self.nodes.insert(id, node);
        self.order.push(id);
    }

    fn remove(&mut self, id: u64) {
        self.nodes.remove(&id);
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn snapshot(&self) -> Vec<Node> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Handlers per lowercased verb.
    by_verb: HashMap<String, Handlers>,
}

/// Handlers keyed by lowercased verb, invoked in registration order.
pub(crate) struct HandlerSet {
    registry: Arc<RwLock<Registry>>,
}

impl HandlerSet {
    pub(crate) fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }

    pub(crate) fn add(
        &self,
        verb: &str,
        handler: Arc<dyn Handler>,
        location: &'static Location<'static>,
    ) -> Remover {
        let verb = verb.to_ascii_lowercase();
        let id = {
            let mut reg = self.registry.write();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.by_verb
                .entry(verb.clone())
                .or_default()
                .insert(id, Node { handler, location });
            id
        };

        let registry: Weak<RwLock<Registry>> = Arc::downgrade(&self.registry);
        Remover::new(move || {
            if let Some(registry) = registry.upgrade() {
                let mut reg = registry.write();
                if let Some(nodes) = reg.by_verb.get_mut(&verb) {
                    nodes.remove(id);
                    if nodes.is_empty() {
                        reg.by_verb.remove(&verb);
                    }
                }
            }
        })
    }

    /// Number of handlers registered for `verb`.
    pub(crate) fn count(&self, verb: &str) -> usize {
        self.registry
            .read()
            .by_verb
            .get(&verb.to_ascii_lowercase())
            .map_or(0, Handlers::len)
    }

    /// Copy of the current handlers for an already-lowercased verb.
    fn nodes(&self, verb: &str) -> Vec<Node> {
        self.registry
            .read()
            .by_verb
            .get(verb)
            .map(Handlers::snapshot)
            .unwrap_or_default()
    }

    /// Start every handler for `verb` on its own task, each with its own
    /// copy of the line.
    pub(crate) fn spawn_all(
        &self,
        verb: &str,
        client: &Client,
        line: &Line,
        recover: Option<&RecoverFn>,
    ) -> Vec<JoinHandle<()>> {
        self.nodes(verb)
            .into_iter()
            .map(|node| spawn_guarded(node, verb, client.clone(), line.clone(), recover.cloned()))
            .collect()
    }
}

/// Run one handler on its own task, turning a panic into a report.
pub(crate) fn spawn_guarded(
    node: Node,
    verb: &str,
    client: Client,
    line: Line,
    recover: Option<RecoverFn>,
) -> JoinHandle<()> {
    let verb = verb.to_owned();
    tokio::spawn(async move {
        let result = AssertUnwindSafe(node.handler.handle(client, line))
            .catch_unwind()
            .await;
        if let Err(payload) = result {
            let panic = HandlerPanic::new(&verb, node.location, payload);
            report_panic(&panic, recover.as_ref());
        }
    })
}

fn report_panic(panic: &HandlerPanic, recover: Option<&RecoverFn>) {
    crate::metrics::record_handler_panic(&panic.verb);
    match recover {
        Some(recover) => recover(panic),
        None => error!(
            verb = %panic.verb,
            location = %panic.location,
            panic = %panic.message,
            "Handler panicked"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Handler for Noop {
        async fn handle(&self, _client: Client, _line: Line) {}
    }

    /// Positions in `all` of the handlers currently registered for `verb`.
    fn positions(set: &HandlerSet, verb: &str, all: &[Arc<dyn Handler>]) -> Vec<usize> {
        set.nodes(verb)
            .iter()
            .filter_map(|node| {
                all.iter()
                    .position(|h| std::ptr::addr_eq(Arc::as_ptr(h), Arc::as_ptr(&node.handler)))
            })
            .collect()
    }

    #[test]
    fn test_order_survives_removals() {
        let set = HandlerSet::new();
        let all: Vec<Arc<dyn Handler>> = (0..50).map(|_| Arc::new(Noop) as Arc<dyn Handler>).collect();
        let mut removers: Vec<Option<Remover>> = all[..40]
            .iter()
            .map(|h| Some(set.add("PRIVMSG", Arc::clone(h), Location::caller())))
            .collect();

        // Drop every handler but the multiples of five, forcing compaction
        // on the inserts that follow.
        for (i, remover) in removers.iter_mut().enumerate() {
            if i % 5 != 0
                && let Some(remover) = remover.take()
            {
                remover.remove();
            }
        }
        assert_eq!(set.count("privmsg"), 8);

        let late: Vec<Remover> = all[40..]
            .iter()
            .map(|h| set.add("privmsg", Arc::clone(h), Location::caller()))
            .collect();

        let mut expected: Vec<usize> = (0..40).step_by(5).collect();
        expected.extend(40..50);
        assert_eq!(positions(&set, "privmsg", &all), expected);
        assert_eq!(set.count("PRIVMSG"), 18);

        drop(late);
        drop(removers);
    }

    #[test]
    fn test_last_removal_drops_verb() {
        let set = HandlerSet::new();
        let remover = set.add("JOIN", Arc::new(Noop), Location::caller());
        assert_eq!(set.count("join"), 1);
        remover.remove();
        assert_eq!(set.count("join"), 0);
        assert!(set.registry.read().by_verb.is_empty());
    }
}
