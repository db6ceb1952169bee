//! The connection engine.
//!
//! A [`Client`] owns one logical connection, its [`Dispatcher`] and its
//! [`StateTracker`]. While connected it runs three tasks:
//!
//! - the **receiver** reads and parses frames and queues [`Line`]s;
//! - the **driver** dispatches those lines one at a time;
//! - the **sender** paces and writes queued frames.
//!
//! ```text
//! Idle ──connect──▶ Dialing ──ok──▶ Registering ──001──▶ Ready ──close──▶ Closed
//!   ▲                  │                 │                 │                 │
//!   └──── failure ─────┘                 └─── I/O error ───┴─── connect ─────┘
//! ```
//!
//! Only wire failures are reported on [`Client::subscribe_errors`]; the
//! connection then closes, wipes the tracker and dispatches `DISCONNECTED`.
//! Reconnecting is up to the caller.

mod commands;
mod pacer;
mod tasks;
mod transport;

use std::panic::Location;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use slirc_proto::command::verbs;
use slirc_proto::{Command, Line, LineCodec, Privileges};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, error, info, warn};

use crate::config::{ClientConfig, Hooks};
use crate::dispatch::{Dispatcher, Handler, HandlerKind, Remover};
use crate::error::{ClientError, Result};
use crate::state::{Member, Room, StateTracker};
use crate::telemetry::spans;

pub use pacer::{FloodPacer, linetime};
pub use transport::Transport;

/// Capacity of the receiver-to-driver queue.
const INBOUND_QUEUE: usize = 256;

/// Capacity of the error broadcast.
const ERROR_QUEUE: usize = 16;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dialing,
    Registering,
    Ready,
    Closed,
}

/// Handles for one live connection.
struct Session {
    /// `None` once `quit` has closed the queue.
    outbound: Option<mpsc::Sender<String>>,
    link: Link,
}

/// A connection's own shutdown signal, held by its tasks.
///
/// Tasks only ever end the connection they were spawned for, even after
/// the client has moved on to a newer one.
#[derive(Clone)]
pub(crate) struct Link {
    id: u64,
    shutdown: broadcast::Sender<()>,
}

impl Link {
    fn new(id: u64) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        Self { id, shutdown }
    }

    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown.subscribe()
    }

    pub(crate) fn close(&self) {
        let _ = self.shutdown.send(());
    }
}

struct ClientInner {
    config: ClientConfig,
    hooks: Hooks,
    tracker: RwLock<StateTracker>,
    dispatcher: Dispatcher,
    phase: watch::Sender<Phase>,
    session: Mutex<Option<Session>>,
    /// Id of the next connection.
    next_link: AtomicU64,
    errors: broadcast::Sender<Arc<ClientError>>,
    flood_protection: AtomicBool,
    /// Removal tokens for the tracking handlers while they are registered.
    tracking: Mutex<Option<Vec<Remover>>>,
}

/// An IRC client connection. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("server", &self.inner.config.server)
            .field("nick", &self.my_nick())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_hooks(config, Hooks::default())
    }

    pub fn with_hooks(config: ClientConfig, hooks: Hooks) -> Self {
        let tracker = StateTracker::new(&config.nick, &config.user, &config.realname);
        let (phase, _) = watch::channel(Phase::Idle);
        let (errors, _) = broadcast::channel(ERROR_QUEUE);
        let client = Self {
            inner: Arc::new(ClientInner {
                dispatcher: Dispatcher::new(hooks.recover.clone()),
                flood_protection: AtomicBool::new(config.flood_protection),
                tracker: RwLock::new(tracker),
                session: Mutex::new(None),
                next_link: AtomicU64::new(0),
                tracking: Mutex::new(None),
                phase,
                errors,
                config,
                hooks,
            }),
        };
        crate::handlers::register_core(&client);
        if client.inner.config.track_state {
            client.enable_state_tracking();
        }
        client
    }

    /// Build a client from a TOML config file.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(ClientConfig::load(path)?))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub(crate) fn hooks(&self) -> &Hooks {
        &self.inner.hooks
    }

    /// Current time from the configured clock.
    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.inner.hooks.clock)()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn phase(&self) -> Phase {
        *self.inner.phase.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.inner.phase.subscribe()
    }

    /// Returns true once the server has welcomed us.
    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Ready
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        let old = self.inner.phase.send_replace(phase);
        if old != phase {
            debug!(from = ?old, to = ?phase, "Phase change");
        }
    }

    /// Move from Idle or Closed to Dialing, or fail if already connected.
    fn begin(&self) -> Result<()> {
        let claimed = self.inner.phase.send_if_modified(|phase| {
            if matches!(phase, Phase::Idle | Phase::Closed) {
                *phase = Phase::Dialing;
                true
            } else {
                false
            }
        });
        if claimed {
            Ok(())
        } else {
            Err(ClientError::AlreadyConnected)
        }
    }

    /// Dial the configured server and start registering.
    ///
    /// Returns once the transport is up; registration continues in the
    /// background and completes with the `CONNECTED` event.
    pub async fn connect(&self) -> Result<()> {
        if self.inner.config.server.is_empty() {
            return Err(ClientError::EmptyServer);
        }
        self.begin()?;
        match transport::dial(&self.inner.config, &self.inner.hooks).await {
            Ok(stream) => {
                self.start(stream);
                Ok(())
            }
            Err(e) => {
                if e.is_wire() {
                    self.report(e.clone());
                } else {
                    warn!(error = %e, "Connect failed");
                }
                self.set_phase(Phase::Idle);
                Err(e)
            }
        }
    }

    /// Start a connection over an already-open stream.
    pub async fn connect_stream<S: Transport>(&self, stream: S) -> Result<()> {
        self.begin()?;
        self.start(Box::new(stream));
        Ok(())
    }

    fn start(&self, stream: Box<dyn Transport>) {
        let (read, write) = tokio::io::split(stream);
        let reader = FramedRead::new(read, LineCodec::new());
        let writer = FramedWrite::new(write, LineCodec::new());

        let (out_tx, out_rx) = mpsc::channel(self.inner.config.send_queue.max(1));
        let (in_tx, in_rx) = mpsc::channel(INBOUND_QUEUE);
        let link = Link::new(self.inner.next_link.fetch_add(1, Ordering::Relaxed));
        let recv_shutdown = link.subscribe();
        let send_shutdown = link.subscribe();

        *self.inner.session.lock() = Some(Session {
            outbound: Some(out_tx),
            link: link.clone(),
        });
        self.set_phase(Phase::Registering);

        // REGISTER is queued first so PASS/NICK/USER precede any reply.
        let register = Line::synthetic(verbs::REGISTER, self.now());
        if in_tx.try_send(register).is_err() {
            error!("Inbound queue rejected REGISTER");
        }

        let span = spans::connection(&self.inner.config.server);
        tokio::spawn(
            tasks::receive(self.clone(), reader, in_tx, link.clone(), recv_shutdown)
                .instrument(span.clone()),
        );
        tokio::spawn(tasks::drive(self.clone(), in_rx, link.clone()).instrument(span.clone()));
        tokio::spawn(tasks::send(self.clone(), writer, out_rx, link, send_shutdown).instrument(span));
    }

    /// Send QUIT and hang up once every queued frame is written.
    ///
    /// Uses `message`, else the configured quit message, else none.
    pub async fn quit(&self, message: Option<&str>) {
        let message = message
            .map(str::to_owned)
            .or_else(|| Some(self.inner.config.quit_message.clone()).filter(|m| !m.is_empty()));
        self.send(Command::QUIT(message)).await;
        if let Some(session) = self.inner.session.lock().as_mut() {
            session.outbound = None;
        }
    }

    /// Drop the connection immediately, discarding queued frames.
    pub fn disconnect(&self) {
        info!("Disconnect requested");
        self.signal_shutdown();
    }

    fn signal_shutdown(&self) {
        if let Some(session) = self.inner.session.lock().as_ref() {
            session.link.close();
        }
    }

    /// Returns true if `link` is the connection currently in use.
    fn is_current(&self, link: &Link) -> bool {
        self.inner
            .session
            .lock()
            .as_ref()
            .is_some_and(|session| session.link.id == link.id)
    }

    /// Log, count and broadcast a wire failure.
    fn report(&self, err: ClientError) {
        error!(server = %self.inner.config.server, error = %err, "Connection failed");
        crate::metrics::record_wire_error(err.error_code());
        let _ = self.inner.errors.send(Arc::new(err));
    }

    /// Report a wire failure of `link` and tear it down. Failures of a
    /// connection that has already been replaced are only logged.
    pub(crate) fn fail(&self, link: &Link, err: ClientError) {
        if self.is_current(link) {
            self.report(err);
        } else {
            debug!(link = link.id, error = %err, "Ignoring failure of a closed connection");
        }
        link.close();
    }

    /// Last step of a connection, run by the driver once the receiver is
    /// gone and every queued line is dispatched.
    pub(crate) async fn finish(&self, link: &Link) {
        link.close();
        let current = {
            let mut session = self.inner.session.lock();
            if session.as_ref().is_some_and(|s| s.link.id == link.id) {
                session.take();
                true
            } else {
                false
            }
        };
        if !current {
            return;
        }
        self.set_phase(Phase::Closed);
        self.inner.tracker.write().wipe();
        info!("Disconnected");
        self.dispatch(Line::synthetic(verbs::DISCONNECTED, self.now())).await;
    }

    /// Wire failures of this client's connections.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<Arc<ClientError>> {
        self.inner.errors.subscribe()
    }

    // ========================================================================
    // Sending
    // ========================================================================

    /// Queue a command, split into as many frames as it needs.
    ///
    /// Waits while the outbound queue is full. Commands sent while not
    /// connected are dropped with a warning.
    pub async fn send(&self, cmd: Command) {
        if let Command::Raw(raw) = &cmd
            && raw.contains(['\r', '\n'])
        {
            info!("Raw frame cut at its first line break");
        }
        self.enqueue(cmd.frames(self.inner.config.effective_split_len()))
            .await;
    }

    async fn enqueue(&self, frames: Vec<String>) {
        let outbound = self
            .inner
            .session
            .lock()
            .as_ref()
            .and_then(|s| s.outbound.clone());
        let Some(outbound) = outbound else {
            warn!(frames = frames.len(), "Not connected, dropping outbound frames");
            return;
        };
        for frame in frames {
            if outbound.send(frame).await.is_err() {
                debug!("Outbound queue closed");
                return;
            }
        }
    }

    pub fn flood_protection(&self) -> bool {
        self.inner.flood_protection.load(Ordering::Relaxed)
    }

    /// Turn outbound pacing on or off.
    pub fn set_flood_protection(&self, on: bool) {
        self.inner.flood_protection.store(on, Ordering::Relaxed);
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// Run `handler` for every line with this verb, after the client's own
    /// handlers and before the next line is dispatched.
    #[track_caller]
    pub fn handle<H: Handler>(&self, verb: &str, handler: H) -> Remover {
        let location = Location::caller();
        self.inner
            .dispatcher
            .add(HandlerKind::Foreground, verb, Arc::new(handler), location)
    }

    /// Start `handler` for every line with this verb without waiting for it.
    #[track_caller]
    pub fn handle_background<H: Handler>(&self, verb: &str, handler: H) -> Remover {
        let location = Location::caller();
        self.inner
            .dispatcher
            .add(HandlerKind::Background, verb, Arc::new(handler), location)
    }

    #[track_caller]
    pub(crate) fn handle_internal<H: Handler>(&self, verb: &str, handler: H) -> Remover {
        let location = Location::caller();
        self.inner
            .dispatcher
            .add(HandlerKind::Internal, verb, Arc::new(handler), location)
    }

    /// Bind a PRIVMSG command prefix such as `!seen`.
    ///
    /// The message may be addressed to us first (`mynick: !seen bob`). The
    /// longest matching prefix wins, and its handler receives the line with
    /// the address and prefix stripped from the text.
    #[track_caller]
    pub fn command<H: Handler>(&self, prefix: &str, handler: H) -> Remover {
        let location = Location::caller();
        self.inner
            .dispatcher
            .commands()
            .add(prefix, Arc::new(handler), location)
    }

    /// Number of user handlers (foreground plus background) for `verb`.
    pub fn handler_count(&self, verb: &str) -> usize {
        let d = &self.inner.dispatcher;
        d.count(HandlerKind::Foreground, verb) + d.count(HandlerKind::Background, verb)
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub(crate) async fn dispatch(&self, line: Line) {
        self.inner.dispatcher.dispatch(self, line).await
    }

    // ========================================================================
    // State
    // ========================================================================

    pub(crate) fn tracker(&self) -> &RwLock<StateTracker> {
        &self.inner.tracker
    }

    pub fn is_tracking(&self) -> bool {
        self.inner.tracking.lock().is_some()
    }

    /// Register the room and member tracking handlers.
    pub fn enable_state_tracking(&self) {
        let mut tracking = self.inner.tracking.lock();
        if tracking.is_none() {
            *tracking = Some(crate::handlers::register_tracking(self));
        }
    }

    /// Remove the tracking handlers and forget every room and member.
    pub fn disable_state_tracking(&self) {
        let removers = self.inner.tracking.lock().take();
        if let Some(removers) = removers {
            for remover in removers {
                remover.remove();
            }
            self.inner.tracker.write().wipe();
        }
    }

    pub fn my_nick(&self) -> String {
        self.inner.tracker.read().my_nick().to_owned()
    }

    /// Snapshot of the local identity.
    pub fn me(&self) -> Member {
        self.inner.tracker.read().me()
    }

    pub fn room(&self, name: &str) -> Option<Room> {
        self.inner.tracker.read().get_room(name)
    }

    pub fn member(&self, nick: &str) -> Option<Member> {
        self.inner.tracker.read().get_member(nick)
    }

    pub fn rooms(&self) -> Vec<Room> {
        self.inner.tracker.read().rooms()
    }

    pub fn members(&self) -> Vec<Member> {
        self.inner.tracker.read().members()
    }

    /// `nick`'s privileges in `room`, if it is there.
    pub fn is_on(&self, room: &str, nick: &str) -> Option<Privileges> {
        self.inner.tracker.read().is_on(room, nick)
    }
}
