//! Core data types shared by the store, index, classifier and planner.

use serde::{Deserialize, Serialize};

/// Coarse utilization band a host currently occupies.
///
/// Thresholds are fixed and numeric (§3 of the design spec): LEE < 0.5,
/// 0.5 <= DEE < 0.85, EED >= 0.85.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Lowest Energy Efficiency — cold, underutilized hosts.
    #[serde(rename = "LEE")]
    Lee,
    /// Desired Energy Efficiency — the target band.
    #[serde(rename = "DEE")]
    Dee,
    /// Energy Efficiency Degradation — hot, overutilized hosts.
    #[serde(rename = "EED")]
    Eed,
}

impl Region {
    /// Classify a total-resources-utilization value into its region.
    pub fn classify(utilization: f64) -> Self {
        if utilization < 0.5 {
            Region::Lee
        } else if utilization < 0.85 {
            Region::Dee
        } else {
            Region::Eed
        }
    }

    /// All regions, in no particular order — used to seed the bucket table.
    pub const ALL: [Region; 3] = [Region::Lee, Region::Dee, Region::Eed];

    /// Short code matching the original system's naming ("LEE"/"DEE"/"EED").
    pub fn code(&self) -> &'static str {
        match self {
            Region::Lee => "LEE",
            Region::Dee => "DEE",
            Region::Eed => "EED",
        }
    }
}

/// A host's current overbooking-sensitivity ceiling: 1 (most restrictive)
/// through 4 (least restrictive). Newly created hosts start at class 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostClass(pub u8);

impl HostClass {
    /// Least restrictive class; the class a freshly created host starts in.
    pub const LEAST_RESTRICTIVE: HostClass = HostClass(4);
    /// Most restrictive class.
    pub const MOST_RESTRICTIVE: HostClass = HostClass(1);

    /// All four classes, ascending (1, 2, 3, 4).
    pub const ALL: [HostClass; 4] =
        [HostClass(1), HostClass(2), HostClass(3), HostClass(4)];

    /// Parse a class value in the 1..=4 range.
    pub fn parse(raw: &str) -> Option<HostClass> {
        raw.trim().parse::<u8>().ok().and_then(HostClass::new)
    }

    /// Construct a class, rejecting anything outside 1..=4.
    pub fn new(value: u8) -> Option<HostClass> {
        if (1..=4).contains(&value) {
            Some(HostClass(value))
        } else {
            None
        }
    }
}

impl std::fmt::Display for HostClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(Region, HostClass)` — the coordinates of a single bucket in the
/// Classified Index. Twelve of these exist (3 regions x 4 classes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub region: Region,
    pub class: HostClass,
}

impl BucketKey {
    pub fn new(region: Region, class: HostClass) -> Self {
        Self { region, class }
    }
}

/// A worker host's resource footprint and current classification.
///
/// Every field here is guarded by the mutex of the bucket the host is
/// currently filed under (see [`crate::registry::index::Bucket`], which
/// folds the Lock Manager's one-mutex-per-bucket responsibility into the
/// Classified Index itself); there is deliberately no interior mutability
/// at this level.
///
/// JSON field names follow the original wire format's lowercase, no-separator
/// tags (`hostip`, `totalmemory`, ...) rather than this crate's own
/// `snake_case`/`camelCase` conventions, since the Scheduler and monitor
/// callers on the other end of this API are unchanged. The one deliberate
/// deviation: the original's `totalresouces` tag (missing a 'r') is
/// corrected to `totalresourcesutilization` here — see DESIGN.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(rename = "hostip")]
    pub host_ip: String,
    pub region: Region,
    #[serde(rename = "hostclass")]
    pub host_class: HostClass,

    #[serde(rename = "totalmemory")]
    pub total_memory: i64,
    #[serde(rename = "totalcpus")]
    pub total_cpus: i64,
    #[serde(rename = "allocatedmemory")]
    pub allocated_memory: i64,
    #[serde(rename = "allocatedcpus")]
    pub allocated_cpus: i64,

    #[serde(rename = "cpu")]
    pub cpu_utilization: f64,
    #[serde(rename = "memory")]
    pub memory_utilization: f64,
    #[serde(rename = "totalresourcesutilization")]
    pub total_resources_utilization: f64,
    #[serde(rename = "overbookingfactor")]
    pub overbooking_factor: f64,
}

impl HostRecord {
    /// Build the record a freshly created host starts with: class 4,
    /// region LEE, zero allocation and zero observed utilization.
    pub fn new(host_ip: String, total_memory: i64, total_cpu_cores: i64) -> Self {
        Self {
            host_ip,
            region: Region::Lee,
            host_class: HostClass::LEAST_RESTRICTIVE,
            total_memory,
            // 1024 shares == one full core, matching the scheduler's cgroup accounting.
            total_cpus: total_cpu_cores * 1024,
            allocated_memory: 0,
            allocated_cpus: 0,
            cpu_utilization: 0.0,
            memory_utilization: 0.0,
            total_resources_utilization: 0.0,
            overbooking_factor: 0.0,
        }
    }

    pub fn bucket_key(&self) -> BucketKey {
        BucketKey::new(self.region, self.host_class)
    }

    /// Recompute `OverbookingFactor = max(allocated/total)` across cpu and memory.
    pub fn recompute_overbooking(&mut self) {
        let cpu_over = self.allocated_cpus as f64 / self.total_cpus as f64;
        let mem_over = self.allocated_memory as f64 / self.total_memory as f64;
        self.overbooking_factor = cpu_over.max(mem_over);
    }
}
