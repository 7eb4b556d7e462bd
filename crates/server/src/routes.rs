use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service::GradeStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::gate::{self, AuthGate};
use crate::handlers;

/// Shared by both listeners; the store is the only thing they have in common.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GradeStore>,
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(store: Arc<dyn GradeStore>, gate: AuthGate) -> Self {
        Self { store, gate }
    }
}

/// Router for the write listener. `POST /` sits behind the authorization gate;
/// `/health` does not.
pub fn write_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", post(handlers::write_grade))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gate::require_expected_user,
        ))
        .route("/health", get(handlers::health))
        .with_state(state);
    with_layers(router)
}

/// Router for the read listener. Unauthenticated.
pub fn read_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(handlers::read_grade))
        .route("/health", get(handlers::health))
        .with_state(state);
    with_layers(router)
}

fn with_layers(router: Router) -> Router {
    router.layer(CorsLayer::very_permissive()).layer(
        TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new()
                    .level(Level::INFO)
                    .include_headers(false),
            )
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .include_headers(false),
            )
            .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
    )
}
