//! Event dispatch.
//!
//! Every line goes through three handler sets in turn:
//!
//! 1. **internal**: the client's own handlers, run concurrently and awaited,
//!    so state is settled before anyone else looks at it;
//! 2. **background**: started concurrently and left running;
//! 3. **foreground**: run concurrently and awaited.
//!
//! The connection's driver task dispatches one line at a time, so a
//! foreground handler never sees the effects of a later line.

mod handler;
mod router;
mod set;

use std::panic::Location;
use std::sync::Arc;

use futures_util::future::join_all;
use slirc_proto::Line;
use tracing::Instrument;

use crate::Client;
use crate::config::RecoverFn;
use crate::telemetry::{DispatchTimer, spans};

pub use handler::{Handler, HandlerPanic};
pub(crate) use router::CommandRouter;
pub use set::Remover;
use set::HandlerSet;

/// Which set a handler is registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandlerKind {
    Internal,
    Background,
    Foreground,
}

pub(crate) struct Dispatcher {
    internal: HandlerSet,
    background: HandlerSet,
    foreground: HandlerSet,
    commands: CommandRouter,
    recover: Option<RecoverFn>,
}

impl Dispatcher {
    pub(crate) fn new(recover: Option<RecoverFn>) -> Self {
        Self {
            internal: HandlerSet::new(),
            background: HandlerSet::new(),
            foreground: HandlerSet::new(),
            commands: CommandRouter::new(),
            recover,
        }
    }

    fn set(&self, kind: HandlerKind) -> &HandlerSet {
        match kind {
            HandlerKind::Internal => &self.internal,
            HandlerKind::Background => &self.background,
            HandlerKind::Foreground => &self.foreground,
        }
    }

    pub(crate) fn add(
        &self,
        kind: HandlerKind,
        verb: &str,
        handler: Arc<dyn Handler>,
        location: &'static Location<'static>,
    ) -> Remover {
        self.set(kind).add(verb, handler, location)
    }

    pub(crate) fn count(&self, kind: HandlerKind, verb: &str) -> usize {
        self.set(kind).count(verb)
    }

    pub(crate) fn commands(&self) -> &CommandRouter {
        &self.commands
    }

    pub(crate) fn recover(&self) -> Option<&RecoverFn> {
        self.recover.as_ref()
    }

    /// Run every handler registered for the line's verb.
    pub(crate) async fn dispatch(&self, client: &Client, line: Line) {
        let verb = line.verb().to_ascii_lowercase();
        let span = spans::dispatch(&verb);
        async {
            let _timer = DispatchTimer::new(&verb);
            let recover = self.recover.as_ref();

            join_all(self.internal.spawn_all(&verb, client, &line, recover)).await;
            // Background tasks run detached; dropping the handles does not
            // cancel them.
            drop(self.background.spawn_all(&verb, client, &line, recover));
            join_all(self.foreground.spawn_all(&verb, client, &line, recover)).await;
        }
        .instrument(span)
        .await
    }
}
