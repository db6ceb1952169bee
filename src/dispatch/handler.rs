//! The handler trait and panic reporting.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::Location;

use async_trait::async_trait;
use slirc_proto::Line;

use crate::Client;

/// Something that reacts to dispatched lines.
///
/// Closures of the form `|client, line| async move { ... }` implement this
/// directly. Each invocation receives its own copy of the line and a handle
/// to the client that dispatched it.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, client: Client, line: Line);
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Client, Line) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, client: Client, line: Line) {
        (self)(client, line).await
    }
}

/// A handler invocation that panicked.
#[derive(Debug, Clone)]
pub struct HandlerPanic {
    /// Lowercased verb being dispatched.
    pub verb: String,
    /// Where the handler was registered.
    pub location: &'static Location<'static>,
    /// The panic payload, when it was a string.
    pub message: String,
}

impl HandlerPanic {
    pub(crate) fn new(
        verb: &str,
        location: &'static Location<'static>,
        payload: Box<dyn Any + Send>,
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self {
            verb: verb.to_owned(),
            location,
            message,
        }
    }
}

impl fmt::Display for HandlerPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handler for {} registered at {}:{} panicked: {}",
            self.verb,
            self.location.file(),
            self.location.line(),
            self.message
        )
    }
}
