//! The three long-lived tasks behind a connection.

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use slirc_proto::{Command, Line, LineCodec};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Interval;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use super::pacer::FloodPacer;
use super::{Client, Link, Phase};
use crate::error::ClientError;
use crate::metrics;

/// Read frames until EOF, a read timeout, an error or shutdown.
pub(super) async fn receive<R>(
    client: Client,
    mut reader: FramedRead<R, LineCodec>,
    inbound: mpsc::Sender<Line>,
    link: Link,
    mut shutdown: broadcast::Receiver<()>,
) where
    R: AsyncRead + Unpin,
{
    let read_timeout = client.config().read_timeout();
    loop {
        let next = tokio::select! {
            _ = shutdown.recv() => break,
            next = tokio::time::timeout(read_timeout, reader.next()) => next,
        };
        let frame = match next {
            Err(_) => {
                client.fail(&link, ClientError::ReadTimeout(read_timeout.as_secs()));
                break;
            }
            Ok(None) => {
                info!("Server closed the connection");
                break;
            }
            Ok(Some(Err(e))) => {
                client.fail(&link, e.into());
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        metrics::record_line_received();
        if frame.is_empty() {
            continue;
        }
        debug!("<- {frame}");
        match Line::parse_at(&frame, client.now()) {
            Ok(line) => {
                if inbound.send(line).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                metrics::record_parse_failure();
                warn!(error = %e, frame = %frame, "Dropping unparseable frame");
            }
        }
    }
    // Stops the sender if it is still running.
    link.close();
}

/// Dispatch queued lines in order, then close the connection.
pub(super) async fn drive(client: Client, mut inbound: mpsc::Receiver<Line>, link: Link) {
    while let Some(line) = inbound.recv().await {
        client.dispatch(line).await;
    }
    client.finish(&link).await;
}

/// Write queued frames, pacing them and interleaving keepalive PINGs.
pub(super) async fn send<W>(
    client: Client,
    mut writer: FramedWrite<W, LineCodec>,
    mut outbound: mpsc::Receiver<String>,
    link: Link,
    mut shutdown: broadcast::Receiver<()>,
) where
    W: AsyncWrite + Unpin,
{
    let mut pacer = FloodPacer::new();
    let mut keepalive = client.config().ping_interval().map(|period| {
        tokio::time::interval_at(tokio::time::Instant::now() + period, period)
    });

    loop {
        let frame = tokio::select! {
            biased;
            _ = shutdown.recv() => return,
            frame = outbound.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
            _ = tick(&mut keepalive) => keepalive_ping(&client),
        };
        if let Some(wait) = pace(&client, &mut pacer, &frame) {
            info!(wait_ms = wait.as_millis() as u64, "Flood protection: delaying send");
            metrics::record_flood_delay();
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    debug!("Dropping delayed frame on shutdown");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
        if let Err(e) = write_frame(&mut writer, frame).await {
            client.fail(&link, e);
            return;
        }
    }

    // The queue was closed by quit and is now drained.
    if let Err(e) = writer.close().await {
        debug!(error = %e, "Error closing connection");
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn keepalive_ping(client: &Client) -> String {
    let nanos = client.now().timestamp_nanos_opt().unwrap_or_default();
    Command::PING(nanos.to_string()).to_string()
}

/// How long `frame` has to wait. Only paced once registered.
fn pace(client: &Client, pacer: &mut FloodPacer, frame: &str) -> Option<Duration> {
    if !client.flood_protection() || client.phase() != Phase::Ready {
        return None;
    }
    pacer.delay(frame.len(), Instant::now())
}

async fn write_frame<W>(
    writer: &mut FramedWrite<W, LineCodec>,
    frame: String,
) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
{
    debug!("-> {}", masked(&frame));
    writer.send(frame).await?;
    metrics::record_line_sent();
    Ok(())
}

/// Hide the password in PASS frames.
fn masked(frame: &str) -> &str {
    if frame.starts_with("PASS ") {
        "PASS ********"
    } else {
        frame
    }
}
