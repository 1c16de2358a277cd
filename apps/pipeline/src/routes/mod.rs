pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::email::handlers::handle_email;
use crate::intake::handlers::handle_intake;
use crate::notify::handlers::handle_notify;
use crate::state::AppState;
use crate::uploads::handlers::handle_upload;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Function handlers ({statusCode, body} envelope)
        .route("/functions/intake", post(handle_intake))
        .route("/functions/notify", post(handle_notify))
        .route("/functions/email", post(handle_email))
        // Applicant-facing upload form
        .route("/api/v1/uploads", post(handle_upload))
        .with_state(state)
}
