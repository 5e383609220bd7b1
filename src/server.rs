use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::domain::submission::RawSubmission;
use crate::error::AppError;
use crate::workflow::relay::relay_submission;

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/webhook", post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(ctx))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookResponse {
    task_id: String,
    url: Option<String>,
    title: String,
    bucket_resolved: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    retryable: bool,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn webhook_handler(
    State(ctx): State<Arc<AppContext>>,
    Json(payload): Json<RawSubmission>,
) -> Response {
    match relay_submission(&ctx, payload).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(WebhookResponse {
                task_id: outcome.task.id,
                url: outcome.task.url,
                title: outcome.command.title,
                bucket_resolved: outcome.section_id.is_some(),
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AppError) -> Response {
    let status = match &err {
        AppError::TrackerTransport(_) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::TrackerRejected { .. } | AppError::TrackerResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let retryable = err.is_retryable();
    tracing::error!(error = %err, retryable, "failed to relay submission");

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            retryable,
        }),
    )
        .into_response()
}
