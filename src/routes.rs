use crate::config::MAX_BODY_BYTES;
use crate::middleware::require_auth;
use crate::{handlers, AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::header,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the full API router. `main` serves it; the integration tests drive
/// it directly, so they exercise the same middleware and layers.
pub fn api_router(state: AppState) -> Router {
    let note_routes = Router::new()
        .route(
            "/api/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/api/notes/{id}",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        )
        .route("/api/notes/{id}/pin", put(handlers::toggle_pin))
        .layer(from_fn_with_state(state.clone(), require_auth));

    // Authorization must be listed explicitly; the wildcard does not cover it.
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/api/register", post(handlers::register))
        .route("/api/verify-otp", post(handlers::verify_otp))
        .route("/api/login", post(handlers::login))
        .merge(note_routes)
        // The inline image payload rides in the JSON body, so the default
        // 2 MiB limit is far too small.
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
