//! The HTTP layer: axum handlers, routes and middleware mapping the
//! registry's operation handlers onto the `/host/...` endpoint table (§6).
//!
//! ## Endpoints
//!
//! - `GET /host/createhost/{ip}&{totalMemBytes}&{totalCpuCores}`
//! - `GET /host/updateclass/{class}&{ip}`
//! - `GET /host/updateboth/{ip}&{cpu}&{mem}`
//! - `GET /host/updatecpu/{ip}&{cpu}`
//! - `GET /host/updatememory/{ip}&{mem}`
//! - `GET /host/updateresources/{ip}&{cpu}&{mem}`
//! - `GET /host/updatetask/{taskId}&{newCpu}&{newMem}&{ip}&{cpuCut}&{memCut}`
//! - `GET /host/list/{class}&{type}`
//! - `GET /host/listkill/{class}`
//! - `POST /host/reschedule`
//! - `POST /host/killtask`
//! - `GET /health`
//!
//! Authentication and rate limiting are explicit Non-goals (§1): this
//! service is reached only by trusted cluster peers (the Scheduler, its
//! monitor sidecars), not by external clients.

pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routes;

pub use routes::build_router;
