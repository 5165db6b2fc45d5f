use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

use withdrawal_gateway::notifier::telegram::{TelegramNotifier, TelegramNotifierConfig};
use withdrawal_gateway::notifier::{Notifier, NotifierError, ParseMode};

fn notifier_for(server: &mockito::ServerGuard) -> TelegramNotifier {
    TelegramNotifier::new(TelegramNotifierConfig {
        api_base: server.url(),
        bot_token: "test-token".to_string(),
        request_timeout: Duration::from_secs(2),
    })
    .unwrap()
}

#[tokio::test]
async fn test_send_posts_expected_payload() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("POST", "/bottest-token/sendMessage")
        .match_body(Matcher::Json(json!({
            "chat_id": 999,
            "text": "hello admin",
            "parse_mode": "HTML"
        })))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let res = notifier_for(&server)
        .send(999, "hello admin", ParseMode::Html)
        .await;
    assert!(res.is_ok());
    m.assert_async().await;
}

#[tokio::test]
async fn test_plain_mode_omits_parse_mode() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("POST", "/bottest-token/sendMessage")
        .match_body(Matcher::Json(json!({
            "chat_id": 7,
            "text": "plain text"
        })))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let res = notifier_for(&server)
        .send(7, "plain text", ParseMode::Plain)
        .await;
    assert!(res.is_ok());
    m.assert_async().await;
}

// expect(2) pins down the retry policy: exactly one retry, then give up.
#[tokio::test]
async fn test_persistent_failure_surfaces_api_error() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("POST", "/bottest-token/sendMessage")
        .with_status(403)
        .with_body("bot was blocked")
        .expect(2)
        .create_async()
        .await;

    let res = notifier_for(&server).send(1, "blocked", ParseMode::Html).await;
    match res {
        Err(NotifierError::Api { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "bot was blocked");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    m.assert_async().await;
}
