//! HTTP API for the child support engine.
//!
//! `POST /calculate` runs an assessment and `GET /rates/{date}` reports the
//! rate constants effective on a date.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::{ApiError, CalculationResponse, RatesResponse};
pub use state::AppState;
