//! `Core`: the process-wide singleton wiring the Store, Classified Index
//! and Runtime Driver together, and exposing the Operation Handlers
//! (§4.6) the HTTP layer calls into. A single `Core` value is used
//! instead of module-level globals (§9); it is expected to live behind
//! an `Arc` shared across the async runtime.

use std::sync::Arc;

use super::classifier::{self, UtilizationUpdate};
use super::driver::{DriverOutput, RunSpec, RuntimeDriver};
use super::error::{RegistryError, RegistryResult};
use super::index::ClassifiedIndex;
use super::model::{HostClass, HostRecord};
use super::planner::{self, Strategy};
use super::store::HostRecordStore;

/// A task's resource footprint as reported by the task registry on
/// termination (§6). `memory == -1` is the "already reconciled, do not
/// subtract again" sentinel.
#[derive(Debug, Clone)]
pub struct TerminatedTask {
    pub ip: String,
    pub cpu: i64,
    pub memory: i64,
    pub previous_class: HostClass,
    pub new_class: HostClass,
    /// Whether the registry is signaling that `previous_class` is no
    /// longer held by any task on this host.
    pub update: bool,
}

/// The already-reconciled sentinel for [`TerminatedTask::memory`] (§6, §11).
pub const ALREADY_RECONCILED: i64 = -1;

/// The classified host index plus its collaborators: the one piece of
/// shared state every operation handler and HTTP handler operates on.
pub struct Core {
    store: HostRecordStore,
    index: ClassifiedIndex,
    driver: Arc<dyn RuntimeDriver>,
}

impl Core {
    pub fn new(driver: Arc<dyn RuntimeDriver>) -> Self {
        Self {
            store: HostRecordStore::new(),
            index: ClassifiedIndex::new(),
            driver,
        }
    }

    /// §4.6.1 — create a host: class 4, region LEE, zero allocation/utilization.
    pub fn create(&self, ip: &str, total_memory: i64, total_cpu_cores: i64) {
        let host = HostRecord::new(ip.to_string(), total_memory, total_cpu_cores);
        let key = host.bucket_key();
        self.index.bucket(key).insert_sorted(key.region, host);
        self.store.set_location(ip, key);
    }

    /// §4.6.2 — tightening class update.
    pub fn update_class(&self, ip: &str, new_class: HostClass) -> RegistryResult<()> {
        classifier::tighten_class(&self.store, &self.index, ip, new_class)
    }

    /// §4.6.3 — full utilization telemetry.
    pub fn update_both(&self, ip: &str, cpu: f64, memory: f64) -> RegistryResult<()> {
        classifier::apply_utilization_update(
            &self.store,
            &self.index,
            ip,
            UtilizationUpdate::Both { cpu, memory },
        )
    }

    /// §4.6.3 — cpu-only utilization telemetry.
    pub fn update_cpu(&self, ip: &str, cpu: f64) -> RegistryResult<()> {
        classifier::apply_utilization_update(&self.store, &self.index, ip, UtilizationUpdate::CpuOnly(cpu))
    }

    /// §4.6.3 — memory-only utilization telemetry.
    pub fn update_memory(&self, ip: &str, memory: f64) -> RegistryResult<()> {
        classifier::apply_utilization_update(
            &self.store,
            &self.index,
            ip,
            UtilizationUpdate::MemoryOnly(memory),
        )
    }

    /// Subtract a footprint from a host's allocated resources:
    /// `AllocatedCPUs/Memory -= (cpu, memory)`, observational only, never
    /// triggers a region/class move. Used by the cut path (§4.6.5) and
    /// termination reconciliation (§4.6.6), both of which subtract a task's
    /// own footprint from the host's allocation.
    pub fn update_allocated(&self, ip: &str, cpu: i64, memory: i64) -> RegistryResult<()> {
        let key = self
            .store
            .location(ip)
            .ok_or_else(|| RegistryError::UnknownHost(ip.to_string()))?;

        let found = self.index.bucket(key).mutate_in_place(ip, |host| {
            host.allocated_cpus -= cpu;
            host.allocated_memory -= memory;
            host.recompute_overbooking();
        });

        if found {
            Ok(())
        } else {
            Err(RegistryError::IndexCorruption {
                host: ip.to_string(),
                bucket: format!("({}, {})", key.region.code(), key.class),
            })
        }
    }

    /// §4.6.4 — `/host/updateresources`: apply a scheduler-reported
    /// allocation delta, `AllocatedCPUs/Memory += (delta_cpu,
    /// delta_memory)`. The original negates its parameters before calling
    /// into the same `UpdateResources` subtraction `update_allocated` uses
    /// (`UpdateAllocatedResourcesAndOverbooking` -> `UpdateResources(-cpu,
    /// -memory)`, which then does `allocated -= cpuUpdate`), so the net
    /// effect here is addition, not the subtraction `update_allocated`
    /// performs for the cut/terminate paths (§8 scenario 6: a delta of
    /// `cpu=-500` must *decrement* `AllocatedCPUs` by 500).
    pub fn update_resources_delta(&self, ip: &str, delta_cpu: i64, delta_memory: i64) -> RegistryResult<()> {
        self.update_allocated(ip, -delta_cpu, -delta_memory)
    }

    /// §4.6.5 — resize a running task (the "cut" path): invoke the
    /// runtime driver, then subtract the cut amounts from the host's
    /// allocation regardless of whether the driver invocation succeeded
    /// (§7 — runtime failures are logged, not unwound).
    pub async fn update_task_resources(
        &self,
        task_id: &str,
        new_cpu: i64,
        new_memory: i64,
        ip: &str,
        cpu_cut: i64,
        memory_cut: i64,
    ) -> RegistryResult<()> {
        if let Err(e) = self.driver.update(task_id, new_cpu, new_memory).await {
            tracing::error!(task_id, %e, "runtime driver failed to resize task");
        }
        self.update_allocated(ip, cpu_cut, memory_cut)
    }

    /// §4.6.6 — terminate reconciliation: subtract the terminated task's
    /// footprint, then relax the host's class if the registry confirmed
    /// the prior restrictive class is no longer held.
    pub fn terminate(&self, task: &TerminatedTask) -> RegistryResult<()> {
        if task.memory != ALREADY_RECONCILED {
            self.update_allocated(&task.ip, task.cpu, task.memory)?;
        }

        if task.update {
            classifier::relax_class(
                &self.store,
                &self.index,
                &task.ip,
                task.previous_class,
                task.new_class,
            )?;
        }

        Ok(())
    }

    /// §4.6's reschedule path (`RescheduleTask` in the original, §11):
    /// invoke the runtime driver to start a container for a rescheduled
    /// task. Failures are logged and swallowed, matching the source's
    /// fire-and-forget `docker run` invocation.
    pub async fn reschedule(&self, spec: RunSpec) -> Option<DriverOutput> {
        match self.driver.run(spec).await {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::error!(%e, "runtime driver failed to reschedule task");
                None
            }
        }
    }

    /// §4.5 — assemble an ordered candidate list for `strategy`.
    pub fn query(&self, strategy: Strategy, requested_class: HostClass) -> Vec<HostRecord> {
        planner::plan(&self.index, strategy, requested_class)
    }

    /// Read a single host's current fields, if it has been created and
    /// isn't caught in a move's transient window (§5).
    pub fn lookup(&self, ip: &str) -> Option<HostRecord> {
        self.store.lookup(&self.index, ip)
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.store.contains(ip)
    }
}
