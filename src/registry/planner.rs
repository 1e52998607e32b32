//! The Query Planner: assembles ordered candidate lists for the three
//! placement strategies by concatenating buckets in a strategy-specific
//! order (§4.5). Each bucket is locked only long enough to copy its
//! current ordering out; locks are never held across buckets, and the
//! returned list is a point-in-time snapshot that may go stale the
//! instant it's handed back.

use super::index::ClassifiedIndex;
use super::model::{HostClass, HostRecord, Region};

/// The three external placement strategies the Scheduler can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Initial placement: coldest hosts first, restrictive-enough classes only.
    Normal,
    /// Resize existing tasks to make room: any class may be cut.
    Cut,
    /// Evict tasks: hottest hosts first, preferring the requested class.
    Kill,
}

/// Build the ordered candidate list for `strategy` given the requested
/// class, by walking the region/class iteration order the strategy
/// dictates and copying each bucket in turn.
pub fn plan(index: &ClassifiedIndex, strategy: Strategy, requested_class: HostClass) -> Vec<HostRecord> {
    let mut hosts = Vec::new();
    for (region, classes) in strategy.region_order(requested_class) {
        for bucket in index.buckets_in_order(region, &classes) {
            hosts.extend(bucket.snapshot());
        }
    }
    hosts
}

impl Strategy {
    /// The `(region, class-iteration-order)` pairs this strategy
    /// concatenates, in the order they should be concatenated.
    fn region_order(&self, requested_class: HostClass) -> Vec<(Region, Vec<HostClass>)> {
        match self {
            Strategy::Normal => {
                let classes = classes_up_to(requested_class);
                vec![(Region::Lee, classes.clone()), (Region::Dee, classes)]
            }
            Strategy::Cut => {
                let all = HostClass::ALL.to_vec();
                vec![(Region::Lee, all.clone()), (Region::Dee, all)]
            }
            Strategy::Kill => {
                let order = kill_class_order(requested_class);
                vec![(Region::Eed, order.clone()), (Region::Dee, order)]
            }
        }
    }
}

/// NORMAL's class filter: classes 1..=requested, ascending — "only
/// buckets with class <= requested class, in ascending class order".
fn classes_up_to(requested_class: HostClass) -> Vec<HostClass> {
    HostClass::ALL
        .into_iter()
        .filter(|c| *c <= requested_class)
        .collect()
}

/// KILL's class order: requested class first, then looser classes
/// ascending, then stricter classes descending toward "1" last —
/// `c, c+1, ..., 4, (c-1, c-2, ..., 1)` (§4.5).
fn kill_class_order(requested_class: HostClass) -> Vec<HostClass> {
    let c = requested_class.0;
    let mut order: Vec<HostClass> = (c..=4).filter_map(HostClass::new).collect();
    order.extend((1..c).rev().filter_map(HostClass::new));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::model::BucketKey;

    fn host(ip: &str, region: Region, class: HostClass, u: f64) -> HostRecord {
        let mut h = HostRecord::new(ip.to_string(), 1024, 1);
        h.region = region;
        h.host_class = class;
        h.total_resources_utilization = u;
        h
    }

    #[test]
    fn normal_strategy_orders_lee_then_dee_up_to_requested_class() {
        let index = ClassifiedIndex::new();
        let c4 = HostClass::new(4).unwrap();
        let c2 = HostClass::new(2).unwrap();

        index
            .bucket(BucketKey::new(Region::Dee, c4))
            .insert_sorted(Region::Dee, host("b", Region::Dee, c4, 0.8));
        index
            .bucket(BucketKey::new(Region::Dee, c4))
            .insert_sorted(Region::Dee, host("a", Region::Dee, c4, 0.7));

        let result = plan(&index, Strategy::Normal, c4);
        let ips: Vec<&str> = result.iter().map(|h| h.host_ip.as_str()).collect();
        assert_eq!(ips, vec!["b", "a"]);

        // Requesting class 2 must not surface a class-4 bucket.
        let result = plan(&index, Strategy::Normal, c2);
        assert!(result.is_empty());
    }

    #[test]
    fn cut_strategy_includes_all_four_classes_lee_then_dee() {
        let index = ClassifiedIndex::new();
        let c1 = HostClass::new(1).unwrap();
        index
            .bucket(BucketKey::new(Region::Lee, c1))
            .insert_sorted(Region::Lee, host("x", Region::Lee, c1, 0.1));

        let result = plan(&index, Strategy::Cut, HostClass::new(4).unwrap());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].host_ip, "x");
    }

    #[test]
    fn kill_strategy_orders_eed_then_dee_class_outward() {
        let index = ClassifiedIndex::new();
        let c4 = HostClass::new(4).unwrap();
        let c2 = HostClass::new(2).unwrap();
        index
            .bucket(BucketKey::new(Region::Eed, c2))
            .insert_sorted(Region::Eed, host("cold", Region::Eed, c2, 0.86));
        index
            .bucket(BucketKey::new(Region::Eed, c4))
            .insert_sorted(Region::Eed, host("loose", Region::Eed, c4, 0.9));

        // requested class 2: order is 2,3,4,(1) within each region.
        let result = plan(&index, Strategy::Kill, c2);
        let ips: Vec<&str> = result.iter().map(|h| h.host_ip.as_str()).collect();
        assert_eq!(ips, vec!["cold", "loose"]);
    }

    #[test]
    fn kill_class_order_matches_spec_example() {
        let c = HostClass::new(4).unwrap();
        let order = kill_class_order(c);
        assert_eq!(order, vec![HostClass::new(4).unwrap(), HostClass::new(3).unwrap(), HostClass::new(2).unwrap(), HostClass::new(1).unwrap()]);

        let c = HostClass::new(2).unwrap();
        let order = kill_class_order(c);
        assert_eq!(
            order,
            vec![
                HostClass::new(2).unwrap(),
                HostClass::new(3).unwrap(),
                HostClass::new(4).unwrap(),
                HostClass::new(1).unwrap(),
            ]
        );
    }
}
