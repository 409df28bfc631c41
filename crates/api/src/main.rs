use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finpulse_core::analytics;
use finpulse_core::domain::analysis::{AnalysisResult, ErrorBody, HealthStatus};
use finpulse_core::domain::contract::ReturnsInput;
use finpulse_core::domain::error::{ComputeError, ValidationError};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

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

    let addr = settings.analytics_addr()?;
    let app = router();

    tracing::info!(%addr, "analytics api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router() -> Router {
    with_layers(
        Router::new()
            .route("/health", get(health))
            .route("/analyze", post(analyze)),
    )
}

fn with_layers(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

// The body is taken as raw bytes so a missing or malformed payload degrades to
// `{}` instead of being rejected by the JSON extractor.
async fn analyze(body: Bytes) -> Result<Json<AnalysisResult>, ApiError> {
    let input = ReturnsInput::from_body(&body)?;
    let result = analytics::analyze(&input, chrono::Utc::now())?;

    tracing::debug!(
        n = input.values().len(),
        risk_score = result.risk_score,
        "analyzed returns"
    );

    Ok(Json(result))
}

#[derive(Debug)]
enum ApiError {
    Validation(ValidationError),
    Internal(anyhow::Error),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<ComputeError> for ApiError {
    fn from(e: ComputeError) -> Self {
        ApiError::Internal(anyhow::Error::new(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => {
                tracing::debug!(error = %e, "rejected analyze request");
                error_response(StatusCode::BAD_REQUEST, e.message())
            }
            ApiError::Internal(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "analyze failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = ErrorBody {
        error: message.to_string(),
    };
    (status, Json(body)).into_response()
}

fn handle_panic(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
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
