//! The Classifier: threshold math, same-bucket re-sorts, and the
//! two-phase cross-bucket move (§4.3, §4.4).
//!
//! Every move in this module follows the same discipline: acquire the
//! source bucket's mutex, remove the host, release; mutate the host's
//! fields and its `(Region, HostClass)`; acquire the destination bucket's
//! mutex, compute the insertion index, insert, release. The two mutexes
//! are never held simultaneously (§4.3) — between the two phases the host
//! is momentarily unreachable through either bucket, an accepted
//! transient (§5, §9).

use super::error::{RegistryError, RegistryResult};
use super::index::ClassifiedIndex;
use super::model::{BucketKey, HostClass, HostRecord, Region};
use super::store::HostRecordStore;

/// The three kinds of telemetry update the Classifier distinguishes
/// (§4.4): a full reading, or a partial one that keeps the other
/// dimension's last known value.
#[derive(Debug, Clone, Copy)]
pub enum UtilizationUpdate {
    Both { cpu: f64, memory: f64 },
    CpuOnly(f64),
    MemoryOnly(f64),
}

/// Apply a telemetry update to `host_ip`: recompute
/// `TotalResourcesUtilization`, and either leave the host's bucket
/// position untouched, re-sort it within its current bucket, or move it
/// to a new region's bucket, depending on whether the update crosses a
/// threshold (§4.4).
pub fn apply_utilization_update(
    store: &HostRecordStore,
    index: &ClassifiedIndex,
    host_ip: &str,
    update: UtilizationUpdate,
) -> RegistryResult<()> {
    let current_key = store
        .location(host_ip)
        .ok_or_else(|| RegistryError::UnknownHost(host_ip.to_string()))?;

    let current = bucket_snapshot(index, host_ip, current_key)?;

    let (new_cpu, new_memory) = match update {
        UtilizationUpdate::Both { cpu, memory } => (cpu, memory),
        UtilizationUpdate::CpuOnly(cpu) => (cpu, current.memory_utilization),
        UtilizationUpdate::MemoryOnly(memory) => (current.cpu_utilization, memory),
    };
    let new_utilization = new_cpu.max(new_memory);
    let new_region = Region::classify(new_utilization);

    let apply_fields = move |host: &mut HostRecord| {
        host.cpu_utilization = new_cpu;
        host.memory_utilization = new_memory;
        host.total_resources_utilization = new_utilization;
    };

    if new_region == current_key.region {
        let unchanged = (new_utilization - current.total_resources_utilization).abs() < f64::EPSILON;
        let bucket = index.bucket(current_key);
        let found = if unchanged {
            bucket.mutate_in_place(host_ip, apply_fields)
        } else {
            bucket.resort(current_key.region, host_ip, apply_fields)
        };
        if !found {
            return Err(corruption(host_ip, current_key));
        }
        Ok(())
    } else {
        let destination = BucketKey::new(new_region, current_key.class);
        move_host(store, index, host_ip, current_key, destination, apply_fields)
    }
}

/// Tighten a host's class on task arrival: moves the host to `requested`
/// iff `requested` is strictly more restrictive (numerically lower) than
/// its current class. A no-op otherwise — class tightening is one-way
/// (§4.4, §4.6.2).
pub fn tighten_class(
    store: &HostRecordStore,
    index: &ClassifiedIndex,
    host_ip: &str,
    requested: HostClass,
) -> RegistryResult<()> {
    let current_key = store
        .location(host_ip)
        .ok_or_else(|| RegistryError::UnknownHost(host_ip.to_string()))?;

    if requested < current_key.class {
        let destination = BucketKey::new(current_key.region, requested);
        move_host(store, index, host_ip, current_key, destination, |_| {})
    } else {
        Ok(())
    }
}

/// Relax a host's class on task departure, iff the class the registry
/// believes is being vacated (`expected_prior`) still matches the host's
/// current class; otherwise a no-op (§4.4, §4.6.6). Returns whether the
/// relax was actually applied.
pub fn relax_class(
    store: &HostRecordStore,
    index: &ClassifiedIndex,
    host_ip: &str,
    expected_prior: HostClass,
    new_class: HostClass,
) -> RegistryResult<bool> {
    let current_key = store
        .location(host_ip)
        .ok_or_else(|| RegistryError::UnknownHost(host_ip.to_string()))?;

    if current_key.class == expected_prior {
        let destination = BucketKey::new(current_key.region, new_class);
        move_host(store, index, host_ip, current_key, destination, |_| {})?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn bucket_snapshot(
    index: &ClassifiedIndex,
    host_ip: &str,
    key: BucketKey,
) -> RegistryResult<HostRecord> {
    index.bucket(key).get(host_ip).ok_or_else(|| corruption(host_ip, key))
}

fn corruption(host_ip: &str, key: BucketKey) -> RegistryError {
    RegistryError::IndexCorruption {
        host: host_ip.to_string(),
        bucket: format!("({}, {})", key.region.code(), key.class),
    }
}

/// The two-phase cross-bucket move shared by every region/class
/// transition: remove under the source lock, release, mutate and
/// reclassify, acquire the destination lock, insert, release (§4.3).
fn move_host(
    store: &HostRecordStore,
    index: &ClassifiedIndex,
    host_ip: &str,
    from: BucketKey,
    to: BucketKey,
    mutate: impl FnOnce(&mut HostRecord),
) -> RegistryResult<()> {
    let mut host = index
        .bucket(from)
        .remove(host_ip)
        .ok_or_else(|| corruption(host_ip, from))?;

    mutate(&mut host);
    host.region = to.region;
    host.host_class = to.class;

    index.bucket(to).insert_sorted(to.region, host);
    store.set_location(host_ip, to);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_host(store: &HostRecordStore, index: &ClassifiedIndex, ip: &str) {
        let host = HostRecord::new(ip.to_string(), 8 * 1024 * 1024 * 1024, 4);
        let key = host.bucket_key();
        index.bucket(key).insert_sorted(key.region, host);
        store.set_location(ip, key);
    }

    #[test]
    fn crossing_into_dee_moves_bucket() {
        let store = HostRecordStore::new();
        let index = ClassifiedIndex::new();
        setup_host(&store, &index, "10.0.0.1");

        apply_utilization_update(
            &store,
            &index,
            "10.0.0.1",
            UtilizationUpdate::Both { cpu: 0.6, memory: 0.3 },
        )
        .unwrap();

        let key = store.location("10.0.0.1").unwrap();
        assert_eq!(key.region, Region::Dee);
        assert_eq!(key.class, HostClass::LEAST_RESTRICTIVE);
        let host = index.bucket(key).get("10.0.0.1").unwrap();
        assert_eq!(host.total_resources_utilization, 0.6);
    }

    #[test]
    fn cpu_only_update_keeps_last_known_memory() {
        let store = HostRecordStore::new();
        let index = ClassifiedIndex::new();
        setup_host(&store, &index, "10.0.0.1");

        apply_utilization_update(
            &store,
            &index,
            "10.0.0.1",
            UtilizationUpdate::Both { cpu: 0.2, memory: 0.4 },
        )
        .unwrap();
        apply_utilization_update(&store, &index, "10.0.0.1", UtilizationUpdate::CpuOnly(0.3)).unwrap();

        let key = store.location("10.0.0.1").unwrap();
        let host = index.bucket(key).get("10.0.0.1").unwrap();
        assert_eq!(host.cpu_utilization, 0.3);
        assert_eq!(host.memory_utilization, 0.4);
        assert_eq!(host.total_resources_utilization, 0.4);
    }

    #[test]
    fn unknown_host_fails_without_mutation() {
        let store = HostRecordStore::new();
        let index = ClassifiedIndex::new();
        let err = apply_utilization_update(
            &store,
            &index,
            "10.0.0.99",
            UtilizationUpdate::Both { cpu: 0.1, memory: 0.1 },
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownHost(_)));
    }

    #[test]
    fn tightening_is_one_way() {
        let store = HostRecordStore::new();
        let index = ClassifiedIndex::new();
        setup_host(&store, &index, "10.0.0.1");

        tighten_class(&store, &index, "10.0.0.1", HostClass::new(2).unwrap()).unwrap();
        assert_eq!(store.location("10.0.0.1").unwrap().class, HostClass::new(2).unwrap());

        // Attempting to "tighten" to a looser class is a no-op.
        tighten_class(&store, &index, "10.0.0.1", HostClass::new(3).unwrap()).unwrap();
        assert_eq!(store.location("10.0.0.1").unwrap().class, HostClass::new(2).unwrap());
    }

    #[test]
    fn relax_requires_matching_prior_class() {
        let store = HostRecordStore::new();
        let index = ClassifiedIndex::new();
        setup_host(&store, &index, "10.0.0.1");
        tighten_class(&store, &index, "10.0.0.1", HostClass::new(1).unwrap()).unwrap();

        // Stale relax signal naming the wrong prior class is a no-op.
        let applied = relax_class(
            &store,
            &index,
            "10.0.0.1",
            HostClass::new(2).unwrap(),
            HostClass::new(4).unwrap(),
        )
        .unwrap();
        assert!(!applied);
        assert_eq!(store.location("10.0.0.1").unwrap().class, HostClass::new(1).unwrap());

        let applied = relax_class(
            &store,
            &index,
            "10.0.0.1",
            HostClass::new(1).unwrap(),
            HostClass::new(4).unwrap(),
        )
        .unwrap();
        assert!(applied);
        assert_eq!(store.location("10.0.0.1").unwrap().class, HostClass::LEAST_RESTRICTIVE);
    }
}
