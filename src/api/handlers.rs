//! HTTP request handlers for the child support engine API.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::compute;

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse, CalculationResponse, RatesResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/rates/:date", get(rates_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a calculation request and returns the assessment wrapped in a
/// [`CalculationResponse`].
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let start_time = Instant::now();
    match compute(
        &request.inputs,
        &request.case_configuration,
        state.config().config(),
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                formula = result.formula_used,
                children = result.child_results.len(),
                payer = %result.payer,
                final_payment = %result.final_payment_amount,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(
                StatusCode::OK,
                CalculationResponse::new(correlation_id, result),
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for GET /rates/{date}.
///
/// Returns the rate constants effective on `date` (formatted `YYYY-MM-DD`).
async fn rates_handler(State(state): State<AppState>, Path(date): Path<String>) -> Response {
    let Ok(parsed) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") else {
        warn!(date = %date, "Invalid rates date");
        return json_response(StatusCode::BAD_REQUEST, ApiError::invalid_date(&date));
    };

    let loader = state.config();
    match loader.rates_for(parsed) {
        Ok(rates) => json_response(
            StatusCode::OK,
            RatesResponse::new(loader.metadata().code.clone(), rates),
        ),
        Err(err) => {
            warn!(date = %parsed, error = %err, "Rates lookup failed");
            error_response(err.into())
        }
    }
}
