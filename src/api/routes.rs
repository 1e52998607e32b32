//! Route table: wires every handler in [`super::handlers`] to the `/host/...`
//! path layout §6 names, plus `/health`, under the ambient middleware stack
//! (request ID, request logging, security headers, CORS — §10), grounded on
//! the teacher's `create_app_router`/`create_v1_router` layering.

use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_host, health_check, kill_task, list_hosts, list_kill_hosts, reschedule,
    update_both, update_class, update_cpu, update_memory, update_resources, update_task,
    AppState,
};
use super::middleware::{
    cors_layer, request_id_middleware, request_logging_middleware, security_headers_middleware,
};
use crate::registry::Core;

/// Build the full application router over a shared [`Core`].
///
/// Authentication and rate limiting are explicit Non-goals (§1) — this
/// service is reached only by the Scheduler and its own monitor sidecars
/// inside the cluster network, not by external clients.
pub fn build_router(core: Arc<Core>) -> Router {
    Router::new()
        .nest("/host", host_routes())
        .route("/health", get(health_check))
        .layer(from_fn(request_logging_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer())
        .with_state(core as AppState)
}

fn host_routes() -> Router<AppState> {
    Router::new()
        .route("/createhost/:params", get(create_host))
        .route("/updateclass/:params", get(update_class))
        .route("/updateboth/:params", get(update_both))
        .route("/updatecpu/:params", get(update_cpu))
        .route("/updatememory/:params", get(update_memory))
        .route("/updateresources/:params", get(update_resources))
        .route("/updatetask/:params", get(update_task))
        .route("/list/:params", get(list_hosts))
        .route("/listkill/:class", get(list_kill_hosts))
        .route("/reschedule", post(reschedule))
        .route("/killtask", post(kill_task))
}
