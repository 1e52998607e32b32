//! The Classified Index: twelve `(Region, HostClass)` buckets, each an
//! ordered sequence of host records, each guarded by its own mutex.
//!
//! This plays the role of the original's `regions map[string]Region` plus
//! `locks map[string]Lock` combined: a bucket's `parking_lot::Mutex`
//! guards both the ordered sequence and every field of the records
//! currently filed under it (§4.3). Bucket mutexes are never held
//! simultaneously — a cross-bucket move always releases the source lock
//! before acquiring the destination lock (see [`crate::registry::core`]).

use parking_lot::Mutex;
use std::collections::HashMap;

use super::model::{BucketKey, HostClass, HostRecord, Region};

/// One `(Region, HostClass)` bucket: a densely packed, kept-sorted vector
/// of host records behind a single mutex.
#[derive(Default)]
pub struct Bucket {
    hosts: Mutex<Vec<HostRecord>>,
}

impl Bucket {
    fn new() -> Self {
        Self {
            hosts: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot the bucket's current ordering. Acquires the lock only for
    /// the duration of the copy (§4.5 bucket-copy discipline).
    pub fn snapshot(&self) -> Vec<HostRecord> {
        self.hosts.lock().clone()
    }

    /// Insert a host into this bucket at the position its utilization
    /// dictates, given the bucket's region (ascending for EED, descending
    /// for LEE/DEE — invariants 2/3).
    pub fn insert_sorted(&self, region: Region, host: HostRecord) {
        let mut hosts = self.hosts.lock();
        let index = binary_search_insertion_point(&hosts, region, host.total_resources_utilization);
        hosts.insert(index, host);
    }

    /// Remove the host with the given IP from this bucket (linear scan,
    /// breaking on first match — invariant 1 guarantees at most one).
    /// Returns the removed record, or `None` if it wasn't present.
    pub fn remove(&self, host_ip: &str) -> Option<HostRecord> {
        let mut hosts = self.hosts.lock();
        let position = hosts.iter().position(|h| h.host_ip == host_ip)?;
        Some(hosts.remove(position))
    }

    /// Mutate a host's fields in place without changing its bucket
    /// membership, then re-sort it to restore invariants 2/3. Used by the
    /// classifier for same-region utilization updates.
    pub fn resort(&self, region: Region, host_ip: &str, mutate: impl FnOnce(&mut HostRecord)) -> bool {
        let mut hosts = self.hosts.lock();
        let Some(position) = hosts.iter().position(|h| h.host_ip == host_ip) else {
            return false;
        };
        let mut host = hosts.remove(position);
        mutate(&mut host);
        let index = binary_search_insertion_point(&hosts, region, host.total_resources_utilization);
        hosts.insert(index, host);
        true
    }

    /// Apply a mutation to a host's fields without touching its position.
    /// Used for allocation-delta updates, which are purely observational
    /// and never trigger a region/class move (§4.6.4).
    pub fn mutate_in_place(&self, host_ip: &str, mutate: impl FnOnce(&mut HostRecord)) -> bool {
        let mut hosts = self.hosts.lock();
        let Some(host) = hosts.iter_mut().find(|h| h.host_ip == host_ip) else {
            return false;
        };
        mutate(host);
        true
    }

    /// Read-only access to a single host's current fields.
    pub fn get(&self, host_ip: &str) -> Option<HostRecord> {
        self.hosts.lock().iter().find(|h| h.host_ip == host_ip).cloned()
    }
}

/// Binary-search insertion point per §4.2's ordered-insertion rule.
///
/// - EED buckets are ascending: find the first index whose element's
///   utilization exceeds `v`, else append.
/// - LEE/DEE buckets are descending: find the first index whose
///   element's utilization is below `v`, else append.
///
/// Ties land at the midpoint of the tied run; stability is not required.
fn binary_search_insertion_point(hosts: &[HostRecord], region: Region, v: f64) -> usize {
    let len = hosts.len();
    if len == 0 {
        return 0;
    }

    let mut lower: i64 = 0;
    let mut upper: i64 = len as i64 - 1;
    let ascending = matches!(region, Region::Eed);

    loop {
        let mid = ((lower + upper) / 2) as usize;
        let mid_u = hosts[mid].total_resources_utilization;

        if lower > upper {
            let stops_here = if ascending { mid_u > v } else { mid_u < v };
            return if stops_here { mid } else { mid + 1 };
        }

        if (mid_u - v).abs() < f64::EPSILON {
            return mid;
        }

        let go_right = if ascending { mid_u < v } else { mid_u > v };
        if go_right {
            lower = mid as i64 + 1;
        } else {
            upper = mid as i64 - 1;
        }
    }
}

/// The full twelve-bucket classified index.
pub struct ClassifiedIndex {
    buckets: HashMap<BucketKey, Bucket>,
}

impl Default for ClassifiedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifiedIndex {
    /// Build the index with all twelve buckets pre-allocated empty.
    pub fn new() -> Self {
        let mut buckets = HashMap::with_capacity(12);
        for region in Region::ALL {
            for class in HostClass::ALL {
                buckets.insert(BucketKey::new(region, class), Bucket::new());
            }
        }
        Self { buckets }
    }

    /// Look up a bucket by its coordinates. Panics if `key` names a region
    /// or class outside the fixed 3x4 table — that can only happen from a
    /// programming error, since `Region`/`HostClass` are closed types.
    pub fn bucket(&self, key: BucketKey) -> &Bucket {
        self.buckets
            .get(&key)
            .expect("bucket table covers every (Region, HostClass) pair")
    }

    /// Iterate bucket coordinates for a region across the given class
    /// order — the shared primitive behind every Query Planner strategy
    /// (§4.5, §9's "one small loop replaces the ladders").
    pub fn buckets_in_order<'a>(
        &'a self,
        region: Region,
        classes: &'a [HostClass],
    ) -> impl Iterator<Item = &'a Bucket> + 'a {
        classes.iter().map(move |&class| self.bucket(BucketKey::new(region, class)))
    }
}
