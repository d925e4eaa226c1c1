//! # HTTP API
//!
//! Router, shared state and the non-pipeline endpoints (health, events,
//! OpenAPI document, embedded static page).

pub mod error;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::get,
    Router,
};
use futures::stream::{self, Stream};
use loadsmith_core::pipeline::{Coordinator, PipelineEvent};
use rust_embed::RustEmbed;
use serde::Serialize;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};

use self::error::ErrorBody;
use self::load_test::{
    AnalysisResponse, GenerateAndRunResponse, GenerateScriptResponse, PromptRequest,
    RunScriptRequest, RunScriptResponse,
};

const EVENT_BUFFER: usize = 100;
const HEARTBEAT: Duration = Duration::from_secs(15);

/// Embedded static page
#[derive(RustEmbed)]
#[folder = "public/"]
struct Assets;

/// Application state
pub struct AppState {
    pub coordinator: Coordinator,
    /// Fan-out of coordinator events to SSE subscribers
    pub event_tx: broadcast::Sender<PipelineEvent>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wrap `coordinator`, bridging its event channel to a broadcast.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(coordinator: Coordinator) -> SharedState {
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (tx, mut rx) = mpsc::channel::<PipelineEvent>(EVENT_BUFFER);

        let bridge = event_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                // No subscribers is fine
                let _ = bridge.send(event);
            }
        });

        Arc::new(Self {
            coordinator: coordinator.with_event_channel(tx),
            event_tx,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Loadsmith API",
        version = "1.0.0",
        description = "Generate k6 load tests from plain language, run them and analyze the results"
    ),
    paths(
        load_test::generate_script,
        load_test::run_script,
        load_test::analyze_results,
        load_test::comprehensive_results_analysis,
        load_test::generate_and_run_test,
        health
    ),
    components(
        schemas(
            PromptRequest,
            RunScriptRequest,
            GenerateScriptResponse,
            RunScriptResponse,
            AnalysisResponse,
            GenerateAndRunResponse,
            ErrorBody,
            HealthResponse
        )
    ),
    tags(
        (name = "load-test", description = "Script generation, execution and analysis"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Build the full application router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .merge(load_test::load_test_routes())
        .route("/health", get(health))
        .route("/events", get(events))
        .route("/openapi.json", get(serve_openapi))
        .fallback(get(serve_static))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// SSE endpoint for pipeline events with heartbeat
async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_tx.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match tokio::time::timeout(HEARTBEAT, rx.recv()).await {
                Ok(Ok(event)) => {
                    let json = serde_json::to_string(&event).unwrap_or_default();
                    return Some((Ok(Event::default().event("pipeline").data(json)), rx));
                }
                // Slow subscriber; skip what was dropped
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "SSE subscriber lagged");
                    continue;
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => return None,
                Err(_) => return Some((Ok(Event::default().comment("heartbeat")), rx)),
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn serve_openapi() -> impl IntoResponse {
    match ApiDoc::openapi().to_json() {
        Ok(spec) => ([(header::CONTENT_TYPE, "application/json")], spec).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn serve_static(uri: Uri) -> Response {
    let path = match uri.path().trim_start_matches('/') {
        "" => "index.html",
        path => path,
    };

    match Assets::get(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                Body::from(file.data.into_owned()),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}
