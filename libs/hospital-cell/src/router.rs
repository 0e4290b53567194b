use axum::{routing::get, Router};

use shared_utils::AppState;

use crate::handlers;

pub fn hospital_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::search_hospitals))
        .route("/{hospital_id}", get(handlers::get_hospital))
        .route("/{hospital_id}/doctors", get(handlers::get_hospital_doctors))
        .with_state(state)
}
