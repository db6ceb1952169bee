//! Integration tests for registration and the client's automatic replies.

mod common;

use std::time::Duration;

use common::{connect, registered, test_config};
use slirc_client::slirc_proto::{Line, verbs};
use slirc_client::{Client, Hooks, Phase};
use tokio::sync::mpsc;

#[tokio::test]
async fn test_registration_sends_nick_and_user() {
    let client = Client::new(test_config("test"));
    let mut server = connect(&client).await.expect("connect");

    server.expect("NICK test").await.expect("NICK");
    server
        .expect("USER ident 12 * :Test User")
        .await
        .expect("USER");
    assert_eq!(client.phase(), Phase::Registering);
}

#[tokio::test]
async fn test_password_sent_first() {
    let mut config = test_config("test");
    config.password = Some("hunter2".into());
    let client = Client::new(config);
    let mut server = connect(&client).await.expect("connect");

    server.expect("PASS hunter2").await.expect("PASS");
    server.expect("NICK test").await.expect("NICK");
    server
        .expect("USER ident 12 * :Test User")
        .await
        .expect("USER");
}

#[tokio::test]
async fn test_ping_answered() {
    let (_client, mut server) = registered(test_config("test")).await.expect("register");

    server.send_raw("PING :1234567890").await.unwrap();
    server.expect("PONG :1234567890").await.expect("PONG");
}

#[tokio::test]
async fn test_welcome_records_host_and_fires_connected() {
    let client = Client::new(test_config("test"));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _remover = client.handle(verbs::CONNECTED, move |client: Client, _line: Line| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(client.me().host);
        }
    });
    let mut server = connect(&client).await.unwrap();
    server.recv().await.unwrap();
    server.recv().await.unwrap();

    server
        .send_raw(":srv 001 test :Welcome to IRC test!ident@somehost.com")
        .await
        .unwrap();

    let host = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("CONNECTED not dispatched")
        .unwrap();
    assert_eq!(host, "somehost.com");
    assert!(client.is_ready());

    // Nothing goes out in response to the welcome itself.
    assert!(server.sync().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_nick_in_use_before_registration() {
    let client = Client::new(test_config("test"));
    let mut server = connect(&client).await.unwrap();
    server.recv().await.unwrap();
    server.recv().await.unwrap();

    server
        .send_raw(":srv 433 * test :Nickname is already in use")
        .await
        .unwrap();
    server.expect("NICK test_").await.expect("retry NICK");
    assert_eq!(client.my_nick(), "test_");
}

#[tokio::test]
async fn test_nick_in_use_custom_generator() {
    let hooks = Hooks::default().with_new_nick(|nick| format!("{nick}2"));
    let client = Client::with_hooks(test_config("test"), hooks);
    let mut server = connect(&client).await.unwrap();
    server.recv().await.unwrap();
    server.recv().await.unwrap();

    server
        .send_raw(":srv 433 * test :Nickname is already in use")
        .await
        .unwrap();
    server.expect("NICK test2").await.unwrap();
    assert_eq!(client.my_nick(), "test2");
}

#[tokio::test]
async fn test_ctcp_version_and_ping() {
    let mut config = test_config("test");
    config.version = "slirc test".into();
    let (_client, mut server) = registered(config).await.unwrap();

    server
        .send_raw(":bob!b@h PRIVMSG test :\x01VERSION\x01")
        .await
        .unwrap();
    server
        .expect("NOTICE bob :\x01VERSION slirc test\x01")
        .await
        .unwrap();

    server
        .send_raw(":bob!b@h PRIVMSG test :\x01PING 42\x01")
        .await
        .unwrap();
    server.expect("NOTICE bob :\x01PING 42\x01").await.unwrap();

    // A PING without a body and unknown sub-verbs get no reply.
    server
        .send_raw(":bob!b@h PRIVMSG test :\x01PING\x01")
        .await
        .unwrap();
    server
        .send_raw(":bob!b@h PRIVMSG test :\x01FINGER\x01")
        .await
        .unwrap();
    assert!(server.sync().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_own_nick_change_followed_without_tracking() {
    let mut config = test_config("test");
    config.track_state = false;
    let (client, mut server) = registered(config).await.unwrap();

    server.send_raw(":test!ident@host.test NICK :renamed").await.unwrap();
    server.sync().await.unwrap();
    assert_eq!(client.my_nick(), "renamed");
}
