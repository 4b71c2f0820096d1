// routes.rs
use axum::{
    routing::{get, post},
    Router,
};
use http::{header::CONTENT_TYPE, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/auth/social", post(handlers::social_login))
        .route("/auth/logout", post(handlers::logout))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/admin/categories", post(handlers::create_category))
        .route(
            "/api/petitions",
            get(handlers::list_petitions).post(handlers::create_petition),
        )
        .route("/api/petitions/{id}", get(handlers::petition_detail))
        .route("/api/petitions/{id}/vote", post(handlers::submit_vote))
        .route("/api/petitions/{id}/voters", get(handlers::petition_voters))
        .route("/api/users", get(handlers::list_users))
        .route("/api/statistics", get(handlers::statistics))
        .layer(cors)
        .with_state(state)
}
