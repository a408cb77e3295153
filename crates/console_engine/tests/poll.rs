mod common;

use std::sync::Arc;
use std::time::Duration;

use console_engine::{
    spawn_poll, ApiSettings, EngineEvent, FailureKind, PollOutcome, PollSettings, ReqwestApi,
    TaskStatus,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_for, TestSink};

fn fast(max_duration: Option<Duration>) -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(15),
        max_duration,
    }
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

#[tokio::test]
async fn completes_after_intermediate_statuses_and_stops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/process/status/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/process/status/t-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "completed", "filename": "movie.mkv"})),
        )
        .mount(&server)
        .await;

    let sink = TestSink::new();
    let handle = spawn_poll(
        Arc::new(api_for(&server)),
        "t-1".to_string(),
        fast(None),
        Arc::new(sink.clone()),
    );
    assert_eq!(handle.task_id(), "t-1");

    let outcome = handle.wait().await;
    assert_eq!(
        outcome,
        PollOutcome::Completed {
            filename: Some("movie.mkv".to_string())
        }
    );

    // No further requests once a terminal status was seen.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(status_requests(&server).await, 3);

    let events = sink.take();
    let statuses: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::TaskStatus { report, .. } => Some(report.status.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(statuses, vec![TaskStatus::Processing, TaskStatus::Processing]);
    assert!(matches!(
        events.last(),
        Some(EngineEvent::PollFinished { task_id, outcome: PollOutcome::Completed { .. } })
            if task_id == "t-1"
    ));
}

#[tokio::test]
async fn error_status_ends_polling_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/process/status/t-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "error_message": "ffmpeg exited 1"})),
        )
        .mount(&server)
        .await;

    let sink = TestSink::new();
    let outcome = spawn_poll(
        Arc::new(api_for(&server)),
        "t-2".to_string(),
        fast(None),
        Arc::new(sink.clone()),
    )
    .wait()
    .await;

    assert_eq!(
        outcome,
        PollOutcome::Failed {
            error: Some("ffmpeg exited 1".to_string())
        }
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(status_requests(&server).await, 1);
}

#[tokio::test]
async fn non_success_response_keeps_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/process/status/t-3"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/process/status/t-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "completed"})))
        .mount(&server)
        .await;

    let outcome = spawn_poll(
        Arc::new(api_for(&server)),
        "t-3".to_string(),
        fast(None),
        Arc::new(TestSink::new()),
    )
    .wait()
    .await;

    assert_eq!(outcome, PollOutcome::Completed { filename: None });
    assert_eq!(status_requests(&server).await, 2);
}

#[tokio::test]
async fn unreachable_server_ends_polling() {
    // Nothing listens on port 1.
    let api = ReqwestApi::new(ApiSettings {
        base_url: "http://127.0.0.1:1/api".to_string(),
        connect_timeout: Duration::from_secs(2),
        ..ApiSettings::default()
    })
    .unwrap();

    let sink = TestSink::new();
    let outcome = spawn_poll(
        Arc::new(api),
        "t-4".to_string(),
        fast(Some(Duration::from_secs(10))),
        Arc::new(sink.clone()),
    )
    .wait()
    .await;

    match outcome {
        PollOutcome::Unreachable(err) => {
            assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout))
        }
        other => panic!("expected unreachable, got {other:?}"),
    }
    assert_eq!(sink.take().len(), 1);
}

#[tokio::test]
async fn undecodable_status_ends_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/process/status/t-5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let outcome = spawn_poll(
        Arc::new(api_for(&server)),
        "t-5".to_string(),
        fast(None),
        Arc::new(TestSink::new()),
    )
    .wait()
    .await;

    match outcome {
        PollOutcome::Unreachable(err) => assert_eq!(err.kind, FailureKind::Decode),
        other => panic!("expected unreachable, got {other:?}"),
    }
}

#[tokio::test]
async fn gives_up_after_cutoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/process/status/t-6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .mount(&server)
        .await;

    let outcome = spawn_poll(
        Arc::new(api_for(&server)),
        "t-6".to_string(),
        fast(Some(Duration::from_millis(70))),
        Arc::new(TestSink::new()),
    )
    .wait()
    .await;

    match outcome {
        PollOutcome::TimedOut { elapsed } => assert!(elapsed >= Duration::from_millis(70)),
        other => panic!("expected timeout, got {other:?}"),
    }
    let requests = status_requests(&server).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(status_requests(&server).await, requests);
}

#[tokio::test]
async fn cancel_stops_before_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "processing"})))
        .mount(&server)
        .await;

    let sink = TestSink::new();
    let handle = spawn_poll(
        Arc::new(api_for(&server)),
        "t-7".to_string(),
        PollSettings {
            interval: Duration::from_secs(30),
            max_duration: None,
        },
        Arc::new(sink.clone()),
    );
    handle.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(5), handle.wait())
        .await
        .expect("poller stops promptly");
    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(status_requests(&server).await, 0);
    assert_eq!(
        sink.take(),
        vec![EngineEvent::PollFinished {
            task_id: "t-7".to_string(),
            outcome: PollOutcome::Cancelled,
        }]
    );
}
