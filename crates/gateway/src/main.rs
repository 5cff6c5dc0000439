//! FacilityChat API Gateway
//!
//! HTTP front-end for the retrieval-augmented chat pipeline.
//! Handles:
//! - Chat sessions, document uploads and questions
//! - Rate limiting and body size limits
//! - Observability (logging, metrics, request ids)

mod handlers;
mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use facilitychat_common::{
    config::AppConfig,
    metrics::{self, LATENCY_BUCKETS, METRICS_PREFIX, UPSTREAM_BUCKETS},
    RagPipeline, SessionStore,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::middleware::rate_limit::{self, RateLimitState};

/// How often idle sessions are swept in the background
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<RagPipeline>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: AppConfig, pipeline: RagPipeline) -> Self {
        let sessions = SessionStore::new(config.session.ttl_minutes);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(sessions),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    init_tracing(&config);

    info!(
        service = %config.observability.service_name,
        "Starting FacilityChat API Gateway v{}",
        facilitychat_common::VERSION
    );

    // Initialize metrics
    if config.observability.metrics_port > 0 {
        install_metrics_exporter(config.observability.metrics_port)?;
    }
    metrics::register_metrics();

    // Build the pipeline (embedder, chat model, library snapshot, transcript)
    let pipeline = RagPipeline::from_config(&config).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize pipeline");
        e
    })?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let shutdown_timeout = config.shutdown_timeout();
    let state = AppState::new(config, pipeline);

    spawn_session_sweeper(state.sessions.clone());

    // Build the router
    let app = create_router(state);

    // Start the server
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_metrics_exporter(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .set_buckets(LATENCY_BUCKETS)?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_embedding_duration_seconds", METRICS_PREFIX)),
            UPSTREAM_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_completion_duration_seconds", METRICS_PREFIX)),
            UPSTREAM_BUCKETS,
        )?
        .install()?;

    info!(port, "Prometheus exporter listening");
    Ok(())
}

fn spawn_session_sweeper(sessions: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sessions.purge_expired().await;
        }
    });
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let rate_limit = RateLimitState::from_config(&state.config.rate_limit);
    let max_body_bytes = state.config.server.max_body_bytes;

    // API routes
    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Prompt templates
        .route("/templates", get(handlers::templates::list_templates))

        // Session endpoints
        .route("/sessions", post(handlers::sessions::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )

        // Document endpoints
        .route(
            "/sessions/{id}/files",
            post(handlers::files::upload_file).get(handlers::files::list_files),
        )

        // Chat endpoint
        .route("/sessions/{id}/messages", post(handlers::chat::send_message));

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            rate_limit::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }

    // In-flight requests get `timeout` to drain before the process exits
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::warn!(timeout_secs = timeout.as_secs(), "Shutdown timeout elapsed, exiting");
        std::process::exit(0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use facilitychat_common::embeddings::HashingEmbedder;
    use facilitychat_common::llm::EchoChatModel;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state(config: AppConfig) -> AppState {
        let pipeline = RagPipeline::new(Arc::new(HashingEmbedder::new(64)), Arc::new(EchoChatModel::new()));
        AppState::new(config, pipeline)
    }

    fn app() -> Router {
        create_router(test_state(AppConfig::default()))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::post("/v1/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await["session_id"].as_str().unwrap().to_string()
    }

    fn multipart_upload(uri: &str, file_name: &str, content_type: &str, content: &str) -> Request<Body> {
        let boundary = "facilitychat-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\n{content}\r\n--{b}--\r\n",
            b = boundary,
            f = file_name,
            c = content_type,
            content = content,
        );
        Request::post(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        let body = body.to_string();
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let response = tokio_test::assert_ok!(
            app()
                .oneshot(Request::get("/v1/health").body(Body::empty()).unwrap())
                .await
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reports_components() {
        let response = app()
            .oneshot(Request::get("/v1/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["embedder"], "hashing");
        assert_eq!(body["chat_model"], "echo");
        assert_eq!(body["library_chunks"], 0);
    }

    #[tokio::test]
    async fn test_templates_listed() {
        let response = app()
            .oneshot(Request::get("/v1/templates").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        let keys: Vec<&str> = body["templates"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys[0], "general");
        assert!(keys.contains(&"fire_protection"));
    }

    #[tokio::test]
    async fn test_upload_and_chat_flow() {
        let app = app();
        let id = create_session(&app).await;

        let manual = "Fire pump FP-1 weekly churn test runs for ten minutes without flow. \
                      Annual flow test measures net pressure at rated and peak flow.";
        let response = app
            .clone()
            .oneshot(multipart_upload(
                &format!("/v1/sessions/{}/files", id),
                "FDNY_fire_pump_FP-1.txt",
                "text/plain",
                manual,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let file = json_body(response).await;
        assert_eq!(file["tags"]["equipment"][0], "fire_protection");
        assert_eq!(file["tags"]["jurisdiction"], "new_york_city");

        let response = app
            .clone()
            .oneshot(json_request(
                &format!("/v1/sessions/{}/messages", id),
                serde_json::json!({ "message": "How long is the churn test?" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let answer = json_body(response).await;
        assert_eq!(answer["template"], "fire_protection");
        assert!(!answer["hits"].as_array().unwrap().is_empty());

        let response = app
            .clone()
            .oneshot(Request::get(format!("/v1/sessions/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let session = json_body(response).await;
        assert_eq!(session["messages"].as_array().unwrap().len(), 2);
        assert_eq!(session["files"].as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(Request::get(format!("/v1/sessions/{}/files", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["files"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_upload_rejected() {
        let app = app();
        let id = create_session(&app).await;

        let response = app
            .oneshot(multipart_upload(
                &format!("/v1/sessions/{}/files", id),
                "riser.dwg",
                "application/octet-stream",
                "binary",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "UNSUPPORTED_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let app = app();
        let id = create_session(&app).await;

        let response = app
            .oneshot(json_request(
                &format!("/v1/sessions/{}/messages", id),
                serde_json::json!({ "message": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session_and_delete() {
        let app = app();
        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/v1/sessions/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "SESSION_NOT_FOUND");

        let id = create_session(&app).await;
        let response = app
            .clone()
            .oneshot(Request::delete(format!("/v1/sessions/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(Request::get(format!("/v1/sessions/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_burst() {
        let mut config = AppConfig::default();
        config.rate_limit.requests_per_second = 1;
        config.rate_limit.burst = 1;
        let app = create_router(test_state(config));

        let first = app
            .clone()
            .oneshot(Request::get("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(Request::get("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut config = AppConfig::default();
        config.server.max_body_bytes = 64;
        let app = create_router(test_state(config));
        let id = create_session(&app).await;

        let response = app
            .oneshot(json_request(
                &format!("/v1/sessions/{}/messages", id),
                serde_json::json!({ "message": "x".repeat(200) }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
