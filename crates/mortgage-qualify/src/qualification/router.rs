use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::audit::AuditSink;
use super::service::{
    BorrowingPowerQuery, LimitsQuery, QualificationQuery, QualificationService, ServiceError,
};

/// Router builder exposing the qualification entry points over HTTP.
pub fn qualification_router<S>(service: Arc<QualificationService<S>>) -> Router
where
    S: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/qualification/limits", post(limits_handler::<S>))
        .route("/api/v1/qualification/solve", post(solve_handler::<S>))
        .route(
            "/api/v1/qualification/purchase-price",
            post(purchase_price_handler::<S>),
        )
        .route(
            "/api/v1/qualification/borrowing-power",
            post(borrowing_power_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn limits_handler<S>(
    State(service): State<Arc<QualificationService<S>>>,
    axum::Json(query): axum::Json<LimitsQuery>,
) -> Response
where
    S: AuditSink + 'static,
{
    respond(service.limits(query))
}

pub(crate) async fn solve_handler<S>(
    State(service): State<Arc<QualificationService<S>>>,
    axum::Json(query): axum::Json<QualificationQuery>,
) -> Response
where
    S: AuditSink + 'static,
{
    respond(service.solve(query))
}

pub(crate) async fn purchase_price_handler<S>(
    State(service): State<Arc<QualificationService<S>>>,
    axum::Json(query): axum::Json<QualificationQuery>,
) -> Response
where
    S: AuditSink + 'static,
{
    respond(service.purchase_price(query))
}

pub(crate) async fn borrowing_power_handler<S>(
    State(service): State<Arc<QualificationService<S>>>,
    axum::Json(query): axum::Json<BorrowingPowerQuery>,
) -> Response
where
    S: AuditSink + 'static,
{
    respond(service.borrowing_power(query))
}

fn respond<T: Serialize>(result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, axum::Json(body)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (error.status_code(), axum::Json(payload)).into_response()
        }
    }
}
