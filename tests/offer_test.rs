//! End-to-end tests for the offer/accept rendezvous.
//!
//! Tests:
//! - Offer waits until an answer is accepted, then returns it
//! - Answers to unknown uids are reported as not pending
//! - Offers without an answer time out and free their uid
//! - Shutdown releases waiting offers

mod common;

use std::time::Duration;

use serde_json::json;
use tryst::client::{AnswerStatus, ConnectConfig, TrystClient};

#[tokio::test]
async fn test_offer_receives_accepted_answer() {
    let server = common::TestServer::start().await;
    let offerer = server.client();
    let answerer = server.client();

    let offer_task =
        tokio::spawn(async move { offerer.offer("abc", &json!({ "sdp": "v=0" })).await });

    let listed = common::wait_for(Duration::from_secs(2), || {
        let answerer = answerer.clone();
        async move {
            answerer
                .list_offers()
                .await
                .map(|uids| uids.contains(&"abc".to_string()))
                .unwrap_or(false)
        }
    })
    .await;
    assert!(listed, "offer should become visible");

    let described = answerer.describe_offer("abc").await.unwrap();
    assert_eq!(described.as_deref(), Some(r#"{"sdp":"v=0"}"#));

    let status = answerer
        .answer("abc", &json!({ "sdp": "v=1" }))
        .await
        .unwrap();
    assert_eq!(status, AnswerStatus::Delivered);

    let answer = offer_task.await.unwrap().unwrap();
    assert_eq!(answer, r#"{"sdp":"v=1"}"#);

    // The uid is gone once the rendezvous completed.
    assert!(answerer.list_offers().await.unwrap().is_empty());
    assert_eq!(
        answerer.answer("abc", &json!("again")).await.unwrap(),
        AnswerStatus::NoPendingOffer
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_answer_without_offer_is_not_pending() {
    let server = common::TestServer::start().await;
    let client = server.client();

    let status = client.answer("nobody", &json!({})).await.unwrap();
    assert_eq!(status, AnswerStatus::NoPendingOffer);

    server.shutdown().await;
}

#[tokio::test]
async fn test_unanswered_offer_times_out_and_frees_uid() {
    let mut config = common::test_config();
    config.offer_timeout_secs = 1;
    let server = common::TestServer::start_with(config).await;
    let client = server.client();

    let result = client.offer("lonely", &json!("hello")).await;
    assert!(result.is_err(), "offer without answer should give up");

    assert!(client.list_offers().await.unwrap().is_empty());
    assert_eq!(
        client.answer("lonely", &json!("late")).await.unwrap(),
        AnswerStatus::NoPendingOffer
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_offer_retries_after_timeout_until_answered() {
    let mut config = common::test_config();
    config.offer_timeout_secs = 1;
    let server = common::TestServer::start_with(config).await;

    let offerer = TrystClient::connect(ConnectConfig {
        endpoint: server.endpoint(),
        offer_attempts: 5,
    })
    .unwrap();
    let answerer = server.client();

    let offer_task = tokio::spawn(async move { offerer.offer("patient", &json!(1)).await });

    // Let the first attempt expire.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // The uid may briefly be absent between attempts.
    let delivered = common::wait_for(Duration::from_secs(3), || {
        let answerer = answerer.clone();
        async move {
            matches!(
                answerer.answer("patient", &json!(2)).await,
                Ok(AnswerStatus::Delivered)
            )
        }
    })
    .await;
    assert!(delivered, "answer should reach a re-posted offer");

    assert_eq!(offer_task.await.unwrap().unwrap(), "2");

    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_releases_waiting_offer() {
    let server = common::TestServer::start().await;
    let offerer = server.client();
    let observer = server.client();

    let offer_task = tokio::spawn(async move { offerer.offer("waiting", &json!({})).await });

    let listed = common::wait_for(Duration::from_secs(2), || {
        let observer = observer.clone();
        async move {
            observer
                .list_offers()
                .await
                .map(|uids| !uids.is_empty())
                .unwrap_or(false)
        }
    })
    .await;
    assert!(listed);

    // Shutdown must not wait for the offer's deadline.
    server.shutdown().await;

    let result = tokio::time::timeout(Duration::from_secs(2), offer_task)
        .await
        .expect("offer should end with the server")
        .unwrap();
    assert!(result.is_err());
}
