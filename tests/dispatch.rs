//! Integration tests for handler dispatch, panic containment and the
//! command router.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{registered, test_config};
use parking_lot::Mutex;
use slirc_client::slirc_proto::{Line, verbs};
use slirc_client::{Client, HandlerPanic, Hooks};
use tokio::sync::mpsc;

#[tokio::test]
async fn test_panicking_handler_is_contained() {
    let panics: Arc<Mutex<Vec<HandlerPanic>>> = Arc::default();
    let seen = Arc::clone(&panics);
    let hooks = Hooks::default().with_recover(move |panic| seen.lock().push(panic.clone()));
    let client = Client::with_hooks(test_config("test"), hooks);

    let calls = Arc::new(AtomicUsize::new(0));
    let _first = client.handle(verbs::PRIVMSG, |_client: Client, line: Line| async move {
        assert!(line.text().is_empty(), "handler blew up");
    });
    let counter = Arc::clone(&calls);
    let _second = client.handle(verbs::PRIVMSG, move |_client: Client, _line: Line| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let mut server = common::connect(&client).await.unwrap();
    server.recv().await.unwrap();
    server.recv().await.unwrap();
    server.send_raw(":bob!b@h PRIVMSG test :hello").await.unwrap();
    server.sync().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let panics = panics.lock();
    assert_eq!(panics.len(), 1);
    assert_eq!(panics[0].verb, "privmsg");
    assert_eq!(panics[0].message, "handler blew up");
    assert!(panics[0].location.file().ends_with("dispatch.rs"));
}

#[tokio::test]
async fn test_panic_without_recover_hook_is_counted() {
    slirc_client::metrics::init();
    let client = Client::new(test_config("test"));

    let calls = Arc::new(AtomicUsize::new(0));
    let _first = client.handle(verbs::PRIVMSG, |_client: Client, line: Line| async move {
        assert!(line.text().is_empty(), "handler blew up");
    });
    let counter = Arc::clone(&calls);
    let _second = client.handle(verbs::PRIVMSG, move |_client: Client, _line: Line| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let mut server = common::connect(&client).await.unwrap();
    server.recv().await.unwrap();
    server.recv().await.unwrap();
    server.send_raw(":bob!b@h PRIVMSG test :hello").await.unwrap();
    server.send_raw(":bob!b@h PRIVMSG test :again").await.unwrap();
    server.sync().await.unwrap();

    // Both lines still reach the healthy handler.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let metrics = slirc_client::metrics::gather_metrics();
    assert!(
        metrics.contains(r#"irc_client_handler_panics_total{verb="privmsg"}"#),
        "panic not counted:\n{metrics}"
    );
}

#[tokio::test]
async fn test_foreground_sees_internal_state() {
    let (client, mut server) = registered(test_config("me")).await.unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _join = client.handle(verbs::JOIN, move |client: Client, line: Line| {
        let tx = tx.clone();
        async move {
            let room = line.arg(0).unwrap_or_default().to_owned();
            let _ = tx.send(client.is_on(&room, line.nick()).is_some());
        }
    });

    server.send_raw(":me!i@h JOIN #c").await.unwrap();
    server.send_raw(":bob!b@h JOIN #c").await.unwrap();
    server.sync().await.unwrap();

    assert_eq!(rx.recv().await, Some(true));
    assert_eq!(rx.recv().await, Some(true));
}

#[tokio::test]
async fn test_lines_dispatched_in_order() {
    let (client, mut server) = registered(test_config("test")).await.unwrap();
    let texts: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&texts);
    let _remover = client.handle(verbs::PRIVMSG, move |_client: Client, line: Line| {
        let sink = Arc::clone(&sink);
        async move {
            // Later lines must not overtake a slow handler.
            tokio::time::sleep(Duration::from_millis(5)).await;
            sink.lock().push(line.text().to_owned());
        }
    });

    for i in 0..5 {
        server
            .send_raw(&format!(":bob!b@h PRIVMSG #c :{i}"))
            .await
            .unwrap();
    }
    server.sync().await.unwrap();
    assert_eq!(*texts.lock(), ["0", "1", "2", "3", "4"]);
}

#[tokio::test]
async fn test_background_handler_not_awaited() {
    let (client, mut server) = registered(test_config("test")).await.unwrap();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let release_rx = Arc::new(tokio::sync::Mutex::new(Some(release_rx)));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();

    let _remover = client.handle_background(verbs::PRIVMSG, move |_client: Client, _line: Line| {
        let release_rx = Arc::clone(&release_rx);
        let done_tx = done_tx.clone();
        async move {
            if let Some(rx) = release_rx.lock().await.take() {
                let _ = rx.await;
            }
            let _ = done_tx.send(());
        }
    });

    server.send_raw(":bob!b@h PRIVMSG #c :hi").await.unwrap();
    // The driver moves on while the background handler is still waiting.
    server.sync().await.unwrap();
    assert!(done_rx.try_recv().is_err());

    release_tx.send(()).unwrap();
    assert_eq!(done_rx.recv().await, Some(()));
}

#[tokio::test]
async fn test_removed_handler_not_called() {
    let (client, mut server) = registered(test_config("test")).await.unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let remover = client.handle(verbs::NOTICE, move |_client: Client, _line: Line| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    assert_eq!(client.handler_count(verbs::NOTICE), 1);

    server.send_raw(":srv NOTICE test :one").await.unwrap();
    server.sync().await.unwrap();
    remover.remove();
    assert_eq!(client.handler_count(verbs::NOTICE), 0);

    server.send_raw(":srv NOTICE test :two").await.unwrap();
    server.sync().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_command_router() {
    let (client, mut server) = registered(test_config("bot")).await.unwrap();
    let _seen = client.command("!seen", |client: Client, line: Line| async move {
        client
            .privmsg(line.target(), &format!("seen: {}", line.text()))
            .await;
    });
    let _s = client.command("!s", |client: Client, line: Line| async move {
        client.privmsg(line.target(), "short").await;
    });

    server
        .send_raw(":alice!a@h PRIVMSG #c :bot: !seen carol")
        .await
        .unwrap();
    server.expect("PRIVMSG #c :seen: carol").await.unwrap();

    server.send_raw(":alice!a@h PRIVMSG bot :!stats").await.unwrap();
    server.expect("PRIVMSG alice :short").await.unwrap();

    server.send_raw(":alice!a@h PRIVMSG #c :hello").await.unwrap();
    assert!(server.sync().await.unwrap().is_empty());
}
