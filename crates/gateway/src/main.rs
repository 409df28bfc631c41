use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finpulse_core::client::http::HttpAnalyticsClient;
use finpulse_core::client::AnalyticsClient;
use finpulse_core::domain::analysis::SERVICE_NAME;
use finpulse_core::domain::contract::{parse_payload, take_returns};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = finpulse_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let client = HttpAnalyticsClient::from_settings(&settings)?;
    tracing::info!(base_url = client.base_url(), "using analytics service");

    let state = AppState {
        analytics: Arc::new(client),
    };

    let addr = settings.gateway_addr()?;
    tracing::info!(%addr, "gateway listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    analytics: Arc<dyn AnalyticsClient>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/info", get(info))
        .route("/api/analyze", post(analyze))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    name: &'static str,
    purpose: &'static str,
    endpoints: Endpoints,
    stack: [&'static str; 4],
}

#[derive(Debug, Serialize)]
struct Endpoints {
    info: &'static str,
    analyze: &'static str,
}

#[derive(Debug, Serialize)]
struct GatewayAnalysis {
    input_count: usize,
    analytics: Value,
    source: &'static str,
}

async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "FinPulse",
        purpose: "Returns analytics: public gateway in front of a stateless analytics service",
        endpoints: Endpoints {
            info: "GET /api/info",
            analyze: "POST /api/analyze  { returns: number[] }",
        },
        stack: ["Rust", "Tokio", "Axum", "Reqwest"],
    })
}

// Only the shape is checked here; element types are validated by the
// analytics service and its 400 is passed through.
async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GatewayAnalysis>, GatewayError> {
    let mut payload = parse_payload(&body);
    let returns = match take_returns(&mut payload) {
        Value::Array(items) if items.len() >= 2 => items,
        _ => return Err(GatewayError::BadInput),
    };
    let input_count = returns.len();

    let reply = state
        .analytics
        .analyze(returns)
        .await
        .map_err(GatewayError::Transport)?;

    if !reply.is_success() {
        return Err(GatewayError::Upstream {
            status: reply.status,
            details: reply.body,
        });
    }

    Ok(Json(GatewayAnalysis {
        input_count,
        analytics: reply.body,
        source: SERVICE_NAME,
    }))
}

#[derive(Debug)]
enum GatewayError {
    BadInput,
    Upstream { status: u16, details: Value },
    Transport(anyhow::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::BadInput => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Provide `returns` as an array with at least 2 numbers."
                })),
            )
                .into_response(),
            GatewayError::Upstream { status, details } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                tracing::warn!(%status, "analytics service rejected request");
                (
                    status,
                    Json(json!({
                        "error": "Analytics service error",
                        "details": details,
                    })),
                )
                    .into_response()
            }
            GatewayError::Transport(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "analytics call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Server error while calling analytics service",
                        "details": format!("{e:#}"),
                    })),
                )
                    .into_response()
            }
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &finpulse_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
