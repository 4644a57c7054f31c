//! Partner portal: pickups, payment codes and commissions.

pub mod commissions;
pub mod orders;
pub mod payment_codes;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the partner routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/orders/{id}/pickup", post(orders::pickup))
        .route("/orders/{id}/payment-code", post(orders::generate_code))
        .route("/payment-code/dismiss", post(orders::dismiss_code))
        .route("/payment-codes", get(payment_codes::index))
        .route("/payment-codes/validate", post(payment_codes::validate))
        .route("/commissions", get(commissions::index))
}
