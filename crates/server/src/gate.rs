use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use common::observability;
use tracing::warn;

use crate::errors::ApiError;
use crate::routes::AppState;

/// Admits a write only when the Basic-auth username equals the configured identity.
///
/// The password half of the credentials is not checked.
#[derive(Clone, Debug)]
pub struct AuthGate {
    expected_user: Arc<str>,
}

impl AuthGate {
    pub fn new(expected_user: impl Into<String>) -> Self {
        Self { expected_user: Arc::from(expected_user.into()) }
    }

    pub fn admits(&self, claimed: &str) -> bool {
        claimed == &*self.expected_user
    }
}

/// Username carried by `Authorization: Basic ...`, or "" when absent or malformed.
pub fn claimed_user(creds: Option<&TypedHeader<Authorization<Basic>>>) -> &str {
    creds.map(|TypedHeader(auth)| auth.username()).unwrap_or("")
}

/// Middleware for the write listener: reject with 401 before the handler runs.
pub async fn require_expected_user(
    State(state): State<AppState>,
    creds: Option<TypedHeader<Authorization<Basic>>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claimed = claimed_user(creds.as_ref());
    if !state.gate.admits(claimed) {
        observability::UNAUTHORIZED_TOTAL.inc();
        warn!(path = %req.uri().path(), claimed_user = %claimed, "write rejected: identity mismatch");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(req).await)
}
