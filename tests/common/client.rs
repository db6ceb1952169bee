//! Client-side helpers.

use std::time::Duration;

use slirc_client::{Client, ClientConfig, Phase};
use tokio::time::timeout;

use super::server::TestServer;

/// A config suited to tests: no pacing, no keepalive PINGs.
pub fn test_config(nick: &str) -> ClientConfig {
    let mut config = ClientConfig::new(nick);
    config.server = "irc.test".into();
    config.user = "ident".into();
    config.realname = "Test User".into();
    config.flood_protection = false;
    config.ping_interval_secs = 0;
    config
}

/// Start `client` on an in-memory stream.
pub async fn connect(client: &Client) -> anyhow::Result<TestServer> {
    let (ours, theirs) = tokio::io::duplex(64 * 1024);
    client.connect_stream(ours).await?;
    Ok(TestServer::new(theirs))
}

/// A client that has registered as `nick` with host `host.test`.
pub async fn registered(config: ClientConfig) -> anyhow::Result<(Client, TestServer)> {
    let nick = config.nick.clone();
    let client = Client::new(config);
    let mut server = connect(&client).await?;

    server.expect(&format!("NICK {nick}")).await?;
    server.expect("USER ident 12 * :Test User").await?;
    server
        .send_raw(&format!(
            ":irc.test 001 {nick} :Welcome to the Test IRC Network {nick}!ident@host.test"
        ))
        .await?;

    let mut phase = client.watch_phase();
    timeout(
        Duration::from_secs(5),
        phase.wait_for(|phase| *phase == Phase::Ready),
    )
    .await??;
    server.sync().await?;
    Ok((client, server))
}
