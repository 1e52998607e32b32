//! Request handlers mapping the operation-handler table (§4.6, §6) onto
//! [`Core`]'s methods.
//!
//! Path-embedded parameters follow the source's `{a}&{b}&{c}` mux
//! templates, joining several logical fields into one `&`-delimited path
//! segment. axum's extractors split on `/`, not `&`, so these routes
//! instead capture the whole trailing segment as a single `String` and
//! split it by hand.
//!
//! Per §7, a malformed numeric field in a path segment is treated as
//! zero rather than rejected — that's the source's own behavior,
//! preserved here. A malformed *class* field is different: class is a
//! closed `1..=4` domain, not a free-form telemetry float, so it's
//! validated and rejected with 400 instead of silently coerced.

use std::sync::Arc;

use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use super::responses::{ApiError, HealthResponse};
use crate::registry::core::TerminatedTask;
use crate::registry::driver::RunSpec;
use crate::registry::error::RegistryError;
use crate::registry::model::HostClass;
use crate::registry::planner::Strategy;
use crate::registry::Core;

/// Shared application state: the registry core behind an `Arc`, threaded
/// through every handler via axum's `State` extractor.
pub type AppState = Arc<Core>;

fn split_amp(raw: &str) -> Vec<&str> {
    raw.split('&').collect()
}

fn parse_f64_or_zero(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

fn parse_i64_or_zero(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

fn parse_class(raw: &str) -> Result<HostClass, ApiError> {
    HostClass::parse(raw).ok_or_else(|| RegistryError::InvalidClass(raw.to_string()).into())
}

// ============================================================================
// GET /host/createhost/{ip}&{totalMemBytes}&{totalCpuCores}
// ============================================================================

pub async fn create_host(State(core): State<AppState>, Path(raw): Path<String>) -> StatusCode {
    let parts = split_amp(&raw);
    let ip = parts.first().copied().unwrap_or_default();
    let total_memory = parts.get(1).map(|s| parse_i64_or_zero(s)).unwrap_or(0);
    let total_cpu_cores = parts.get(2).map(|s| parse_i64_or_zero(s)).unwrap_or(0);

    core.create(ip, total_memory, total_cpu_cores);
    StatusCode::CREATED
}

// ============================================================================
// GET /host/updateclass/{class}&{ip}
// ============================================================================

pub async fn update_class(
    State(core): State<AppState>,
    Path(raw): Path<String>,
) -> Result<StatusCode, ApiError> {
    let parts = split_amp(&raw);
    let class = parse_class(parts.first().copied().unwrap_or_default())?;
    let ip = parts.get(1).copied().unwrap_or_default();

    core.update_class(ip, class)?;
    Ok(StatusCode::OK)
}

// ============================================================================
// GET /host/updateboth/{ip}&{cpu}&{mem}
// GET /host/updatecpu/{ip}&{cpu}
// GET /host/updatememory/{ip}&{mem}
//
// Telemetry paths. §5/§10 model the source's fire-and-forget
// `go UpdateTotalResourcesUtilization(...)` as a spawned task over the
// shared `Arc<Core>`, so the handler returns to the monitor without
// waiting on the (possible) reclassification.
// ============================================================================

pub async fn update_both(State(core): State<AppState>, Path(raw): Path<String>) -> StatusCode {
    let parts = split_amp(&raw);
    let ip = parts.first().copied().unwrap_or_default().to_string();
    let cpu = parts.get(1).map(|s| parse_f64_or_zero(s)).unwrap_or(0.0);
    let memory = parts.get(2).map(|s| parse_f64_or_zero(s)).unwrap_or(0.0);

    tokio::spawn(async move {
        if let Err(e) = core.update_both(&ip, cpu, memory) {
            tracing::error!(ip, %e, "updateboth failed");
        }
    });

    StatusCode::OK
}

pub async fn update_cpu(State(core): State<AppState>, Path(raw): Path<String>) -> StatusCode {
    let parts = split_amp(&raw);
    let ip = parts.first().copied().unwrap_or_default().to_string();
    let cpu = parts.get(1).map(|s| parse_f64_or_zero(s)).unwrap_or(0.0);

    tokio::spawn(async move {
        if let Err(e) = core.update_cpu(&ip, cpu) {
            tracing::error!(ip, %e, "updatecpu failed");
        }
    });

    StatusCode::OK
}

pub async fn update_memory(State(core): State<AppState>, Path(raw): Path<String>) -> StatusCode {
    let parts = split_amp(&raw);
    let ip = parts.first().copied().unwrap_or_default().to_string();
    let memory = parts.get(1).map(|s| parse_f64_or_zero(s)).unwrap_or(0.0);

    tokio::spawn(async move {
        if let Err(e) = core.update_memory(&ip, memory) {
            tracing::error!(ip, %e, "updatememory failed");
        }
    });

    StatusCode::OK
}

// ============================================================================
// GET /host/updateresources/{ip}&{cpu}&{mem}
//
// Allocation delta from the Scheduler's own placement decision. Mirrors
// the source's `go UpdateAllocatedResourcesAndOverbooking(...)`
// fire-and-forget call, which nets to `allocated += delta` (see
// `Core::update_resources_delta`).
// ============================================================================

pub async fn update_resources(State(core): State<AppState>, Path(raw): Path<String>) -> StatusCode {
    let parts = split_amp(&raw);
    let ip = parts.first().copied().unwrap_or_default().to_string();
    let delta_cpu = parts.get(1).map(|s| parse_i64_or_zero(s)).unwrap_or(0);
    let delta_memory = parts.get(2).map(|s| parse_i64_or_zero(s)).unwrap_or(0);

    tokio::spawn(async move {
        if let Err(e) = core.update_resources_delta(&ip, delta_cpu, delta_memory) {
            tracing::error!(ip, %e, "updateresources failed");
        }
    });

    StatusCode::OK
}

// ============================================================================
// GET /host/updatetask/{taskId}&{newCpu}&{newMem}&{ip}&{cpuCut}&{memCut}
// ============================================================================

pub async fn update_task(
    State(core): State<AppState>,
    Path(raw): Path<String>,
) -> Result<StatusCode, ApiError> {
    let parts = split_amp(&raw);
    let task_id = parts.first().copied().unwrap_or_default();
    let new_cpu = parts.get(1).map(|s| parse_i64_or_zero(s)).unwrap_or(0);
    let new_memory = parts.get(2).map(|s| parse_i64_or_zero(s)).unwrap_or(0);
    let ip = parts.get(3).copied().unwrap_or_default();
    let cpu_cut = parts.get(4).map(|s| parse_i64_or_zero(s)).unwrap_or(0);
    let memory_cut = parts.get(5).map(|s| parse_i64_or_zero(s)).unwrap_or(0);

    core.update_task_resources(task_id, new_cpu, new_memory, ip, cpu_cut, memory_cut)
        .await?;
    Ok(StatusCode::OK)
}

// ============================================================================
// GET /host/list/{class}&{type}      (type: "1" NORMAL, "2" CUT)
// GET /host/listkill/{class}
// ============================================================================

pub async fn list_hosts(
    State(core): State<AppState>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let parts = split_amp(&raw);
    let class = parse_class(parts.first().copied().unwrap_or_default())?;
    let list_type = parts.get(1).copied().unwrap_or("1");

    let strategy = if list_type == "2" { Strategy::Cut } else { Strategy::Normal };
    Ok(Json(core.query(strategy, class)))
}

pub async fn list_kill_hosts(
    State(core): State<AppState>,
    Path(class): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let class = parse_class(&class)?;
    Ok(Json(core.query(Strategy::Kill, class)))
}

// ============================================================================
// POST /host/reschedule
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub struct RescheduleRequest {
    pub cpu: i64,
    pub memory: i64,
    pub taskclass: String,
    pub image: String,
    pub tasktype: String,
}

pub async fn reschedule(State(core): State<AppState>, Json(body): Json<RescheduleRequest>) -> StatusCode {
    core.reschedule(RunSpec {
        image: body.image,
        cpu_shares: body.cpu,
        memory_bytes: body.memory,
        task_class: body.taskclass,
        task_type: body.tasktype,
    })
    .await;

    StatusCode::OK
}

// ============================================================================
// POST /host/killtask
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub struct KillTaskRequest {
    pub cpu: i64,
    pub memory: i64,
    pub previousclass: String,
    pub newclass: String,
    pub update: bool,
    pub ip: String,
}

pub async fn kill_task(
    State(core): State<AppState>,
    Json(body): Json<KillTaskRequest>,
) -> Result<StatusCode, ApiError> {
    let previous_class = parse_class(&body.previousclass)?;
    let new_class = parse_class(&body.newclass)?;

    core.terminate(&TerminatedTask {
        ip: body.ip,
        cpu: body.cpu,
        memory: body.memory,
        previous_class,
        new_class,
        update: body.update,
    })?;

    Ok(StatusCode::OK)
}

// ============================================================================
// GET /health
// ============================================================================

pub async fn health_check() -> HealthResponse {
    HealthResponse::healthy()
}
