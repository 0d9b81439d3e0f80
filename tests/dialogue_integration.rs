//! Integration tests for the classification gateway and the dialogue API.
//!
//! Each test spins up Axum servers on random ports: a stub prediction
//! backend, and where needed the dialogue REST surface itself.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::timeout;

use geotextile_assist::catalog::TopicCatalog;
use geotextile_assist::channels::dialogue_routes;
use geotextile_assist::config::GatewayConfig;
use geotextile_assist::dialogue::{DialoguePhase, Input};
use geotextile_assist::error::GatewayError;
use geotextile_assist::gateway::{ClassificationRequest, Classifier, HttpClassifier};
use geotextile_assist::session::DialogueSession;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Requests captured by the stub backend.
type Captured = Arc<Mutex<Vec<Value>>>;

async fn serve(app: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

/// Stub backend answering every `/predict` with `status` and `body`.
async fn start_backend(status: StatusCode, body: &'static str) -> (u16, Captured) {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route(
            "/predict",
            post(
                move |State(captured): State<Captured>, Json(request): Json<Value>| async move {
                    captured.lock().unwrap().push(request);
                    (status, body)
                },
            ),
        )
        .with_state(Arc::clone(&captured));
    (serve(app).await, captured)
}

fn gateway(port: u16, timeout: Duration) -> GatewayConfig {
    GatewayConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        predict_path: "/predict".to_string(),
        timeout,
    }
}

fn request() -> ClassificationRequest {
    let mut request = ClassificationRequest::default();
    request
        .clusters
        .insert("Tensile Cluster".to_string(), "C2".to_string());
    request
}

const PREDICTION: &str =
    r#"{"predicted_type": "PP Woven", "confidence": 88, "description": "Woven polypropylene."}"#;

#[tokio::test]
async fn classifier_parses_successful_reply() {
    timeout(TEST_TIMEOUT, async {
        let (port, captured) = start_backend(StatusCode::OK, PREDICTION).await;
        let classifier = HttpClassifier::new(&gateway(port, Duration::from_secs(2))).unwrap();

        let prediction = classifier.classify(&request()).await.unwrap();
        assert_eq!(prediction.predicted_type, "PP Woven");
        assert_eq!(prediction.confidence, 88.0);

        let sent = captured.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], serde_json::json!({"clusters": {"Tensile Cluster": "C2"}}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn server_error_is_connection_failure() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_backend(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        let classifier = HttpClassifier::new(&gateway(port, Duration::from_secs(2))).unwrap();

        match classifier.classify(&request()).await {
            Err(GatewayError::ConnectionFailed { reason }) => assert!(reason.contains("500")),
            other => panic!("expected ConnectionFailed, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn missing_field_is_malformed() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) =
            start_backend(StatusCode::OK, r#"{"predicted_type": "PP Woven"}"#).await;
        let classifier = HttpClassifier::new(&gateway(port, Duration::from_secs(2))).unwrap();

        assert!(matches!(
            classifier.classify(&request()).await,
            Err(GatewayError::MalformedResponse { .. })
        ));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn slow_backend_times_out() {
    timeout(TEST_TIMEOUT, async {
        let app = Router::new().route(
            "/predict",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                PREDICTION
            }),
        );
        let port = serve(app).await;
        let classifier = HttpClassifier::new(&gateway(port, Duration::from_millis(200))).unwrap();

        assert_eq!(
            classifier.classify(&request()).await,
            Err(GatewayError::Timeout {
                after: Duration::from_millis(200)
            })
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn refused_connection_is_connection_failure() {
    timeout(TEST_TIMEOUT, async {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let classifier = HttpClassifier::new(&gateway(port, Duration::from_secs(2))).unwrap();

        assert!(matches!(
            classifier.classify(&request()).await,
            Err(GatewayError::ConnectionFailed { .. })
        ));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_session_sends_nine_clusters() {
    timeout(TEST_TIMEOUT, async {
        let (port, captured) = start_backend(StatusCode::OK, PREDICTION).await;
        let classifier = Arc::new(HttpClassifier::new(&gateway(port, Duration::from_secs(2))).unwrap());
        let session = DialogueSession::new(Arc::new(TopicCatalog::geotextile()), classifier);

        session.submit(Input::Choice(0)).await.unwrap(); // consent
        session.submit(Input::Text("tensile".to_string())).await.unwrap();
        session.submit(Input::Choice(0)).await.unwrap(); // "Got it"
        session.submit(Input::Text("45".to_string())).await.unwrap();
        session.submit(Input::Choice(5)).await.unwrap(); // "Not sure"

        loop {
            let snapshot = session.snapshot().await;
            match snapshot.phase {
                DialoguePhase::AwaitingTopicChoice { .. } => {
                    session.submit(Input::Choice(0)).await.unwrap()
                }
                DialoguePhase::AwaitingStepAnswer { .. } => {
                    session.submit(Input::Choice(1)).await.unwrap()
                }
                _ => break,
            }
        }
        assert_eq!(session.snapshot().await.phase, DialoguePhase::AwaitingFinalConfirm);

        session.submit(Input::Text("yes".to_string())).await.unwrap();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, DialoguePhase::AwaitingRestartConfirm);
        assert!(snapshot
            .messages
            .iter()
            .any(|m| m.text.contains("Predicted Geotextile Type: PP Woven")));

        let sent = captured.lock().unwrap();
        let clusters = sent[0]["clusters"].as_object().unwrap();
        assert_eq!(clusters.len(), 9);
        assert_eq!(clusters["Tensile Cluster"], "C2");
        assert_eq!(clusters["Puncture Cluster"], "C2");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn dialogue_api_reports_backend_failure() {
    timeout(TEST_TIMEOUT, async {
        let (backend_port, _) = start_backend(StatusCode::BAD_GATEWAY, "").await;
        let classifier =
            Arc::new(HttpClassifier::new(&gateway(backend_port, Duration::from_secs(2))).unwrap());
        let session = Arc::new(DialogueSession::new(Arc::new(TopicCatalog::geotextile()), classifier));
        let port = serve(dialogue_routes(session)).await;

        let client = reqwest::Client::new();
        let base = format!("http://127.0.0.1:{port}/api/dialogue");
        let mut body: Value = client
            .post(format!("{base}/input"))
            .json(&serde_json::json!({"choice": 0}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        while body["phase"]["phase"] != "awaiting_final_confirm" {
            body = client
                .post(format!("{base}/input"))
                .json(&serde_json::json!({"choice": 0}))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        }

        let response = client
            .post(format!("{base}/input"))
            .json(&serde_json::json!({"text": "yes"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.unwrap();

        assert_eq!(body["phase"]["phase"], "awaiting_final_confirm");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.last().unwrap()["text"], "Error connecting to backend.");
        assert!(!messages
            .iter()
            .any(|m| m["text"].as_str().unwrap_or_default().contains("Predicted")));
    })
    .await
    .expect("test timed out");
}
