use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use research_desk::client::{HttpResearchClient, ResearchService};
use research_desk::config::ServiceConfig;
use research_desk::controller::{RequestController, SubmissionInput, SubmissionState};
use research_desk::error::ResearchError;
use research_desk::models::ResearchRequest;
use research_desk::projection::{confidence_tier, percent, ConfidenceTier, StatusSummary};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}:{}", addr.ip(), addr.port())
}

fn client_for(base_url: String) -> HttpResearchClient {
    HttpResearchClient::with_config(&ServiceConfig {
        base_url,
        timeout_secs: 10,
        default_max_iterations: 1,
    })
}

fn request() -> ResearchRequest {
    ResearchRequest {
        query: "test".into(),
        max_iterations: 2,
        api_key: "k".into(),
        tavily_api_key: None,
    }
}

fn success_body() -> Value {
    json!({
        "query": "test",
        "timestamp": "2025-05-01T12:00:00",
        "report": "# Report\n\nBody",
        "confidence": 0.9,
        "search_results_count": 5,
        "validations_count": 3,
        "iterations": 2,
        "conflicts_detected": false,
        "references": [
            {"title": "Rust", "source": "https://www.rust-lang.org", "relevance_score": 0.8}
        ],
        "full_state": {
            "messages": ["planning", "searching"],
            "search_queries": ["rust safety"],
            "current_iteration": 2
        }
    })
}

#[tokio::test]
async fn research_posts_wire_body_and_parses_result() {
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let sink = captured.clone();
    let app = Router::new().route(
        "/research",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(body);
                Json(success_body())
            }
        }),
    );
    let client = client_for(spawn(app).await);

    let result = client.research(request()).await.unwrap();

    assert_eq!(result.confidence, 0.9);
    assert_eq!(result.references.len(), 1);
    assert_eq!(
        result.full_state.unwrap().search_queries.unwrap(),
        vec!["rust safety".to_string()]
    );

    let body = captured.lock().unwrap().clone().unwrap();
    assert_eq!(
        body,
        json!({
            "query": "test",
            "max_iterations": 2,
            "anthropic_api_key": "k",
            "tavily_api_key": null
        })
    );
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let app = Router::new().route(
        "/research",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "Erro durante a pesquisa: boom"})),
            )
        }),
    );
    let client = client_for(spawn(app).await);

    let err = client.research(request()).await.unwrap_err();

    assert_eq!(
        err,
        ResearchError::Transport {
            status: 500,
            reason: "Internal Server Error".into()
        }
    );
    assert_eq!(err.user_message(), "API error: 500 Internal Server Error");
}

#[tokio::test]
async fn wrong_shape_is_malformed_response() {
    let app = Router::new().route(
        "/research",
        post(|| async { Json(json!({"report": "only a report"})) }),
    );
    let client = client_for(spawn(app).await);

    let err = client.research(request()).await.unwrap_err();
    assert!(matches!(err, ResearchError::MalformedResponse(_)));
}

#[tokio::test]
async fn zero_iterations_is_malformed_response() {
    let mut body = success_body();
    body["iterations"] = json!(0);
    let app = Router::new().route(
        "/research",
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    let client = client_for(spawn(app).await);

    let err = client.research(request()).await.unwrap_err();
    assert!(matches!(err, ResearchError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_service_is_unknown_error() {
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(format!("http://{}:{}", addr.ip(), addr.port()));
    let err = client.research(request()).await.unwrap_err();
    assert!(matches!(err, ResearchError::Unknown(_)));
}

#[tokio::test]
async fn health_and_limits_endpoints() {
    let app = Router::new()
        .route(
            "/health",
            get(|| async {
                Json(json!({"status": "healthy", "version": "1.0.0", "timestamp": "now"}))
            }),
        )
        .route(
            "/api/config",
            get(|| async {
                Json(json!({
                    "max_iterations_allowed": 3,
                    "min_iterations_allowed": 1,
                    "default_iterations": 1,
                    "tavily_optional": true,
                    "supported_features": ["research", "validation"]
                }))
            }),
        );
    let client = client_for(format!("{}/", spawn(app).await));

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");

    let limits = client.limits().await.unwrap();
    assert_eq!(limits.max_iterations_allowed, 3);
    assert_eq!(limits.supported_features.len(), 2);
}

#[tokio::test]
async fn submit_scenario_end_to_end() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/research",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(success_body())
            }
        }),
    );
    let client = Arc::new(client_for(spawn(app).await));
    let mut controller = RequestController::new(client);

    let blank = controller.submit(SubmissionInput {
        query: "   ".into(),
        api_key: "k".into(),
        max_iterations: 2,
        search_key: None,
    });
    assert!(blank.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let pending = controller
        .submit(SubmissionInput {
            query: "test".into(),
            api_key: "k".into(),
            max_iterations: 2,
            search_key: None,
        })
        .unwrap();
    assert_eq!(controller.state(), &SubmissionState::Loading);

    let completion = pending.run().await;
    assert!(controller.resolve(completion));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let result = controller.state().result().unwrap();
    assert_eq!(percent(result.confidence), 90);
    assert_eq!(confidence_tier(result.confidence), ConfidenceTier::High);
    assert_eq!(StatusSummary::from_result(result).conflicts_label, "No conflicts");
}
