use axum::{routing::get, Router};

use shared_utils::AppState;

use crate::handlers;

pub fn doctor_routes(state: AppState) -> Router {
    Router::new()
        .route("/search", get(handlers::search_doctors_public))
        .route("/{doctor_id}", get(handlers::get_doctor_public))
        .route("/{doctor_id}/working-hours", get(handlers::get_working_hours_public))
        .route("/{doctor_id}/available-slots", get(handlers::get_available_slots_public))
        .with_state(state)
}
