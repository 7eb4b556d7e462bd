use std::sync::Arc;

use axum::Router;
use common::{admin_http, observability};
use configs::AppConfig;
use service::{GradeStore, MemoryGradeStore};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::gate::AuthGate;
use crate::routes::{self, AppState};

/// Build both routers over one shared store.
pub fn build_routers(store: Arc<dyn GradeStore>, gate: AuthGate) -> (Router, Router) {
    let state = AppState::new(store, gate);
    (routes::write_router(state.clone()), routes::read_router(state))
}

/// Bind `addr` and serve `app` until the listener fails.
/// Bind or serve errors are logged and the routine returns; the process keeps running.
pub async fn start_listener(name: &'static str, addr: String, app: Router) {
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(listener = name, %addr, error = %e, "bind failed");
            return;
        }
    };
    info!(listener = name, %addr, "listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(listener = name, %addr, error = %e, "listener stopped");
    }
}

/// Public entry: run the write and read listeners (and the admin one if enabled)
/// until both have returned.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store: Arc<dyn GradeStore> = MemoryGradeStore::new();
    let gate = AuthGate::new(cfg.auth.expected_user.clone());
    let (write_app, read_app) = build_routers(store, gate);

    if cfg.admin.enabled {
        admin_http::spawn_admin_server(cfg.admin.addr(), observability::encode_metrics);
    }

    tokio::join!(
        start_listener("write", cfg.write.addr(), write_app),
        start_listener("read", cfg.read.addr(), read_app),
    );
    Ok(())
}
