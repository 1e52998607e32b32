// Property tests for the classified index's concurrency invariants (§8):
// every placement query returns each host at most once, and every host
// created is reachable through exactly one bucket at any quiescent point.

#[cfg(test)]
mod placement_properties_tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use hostreg::registry::driver::MockRuntimeDriver;
    use hostreg::registry::model::HostClass;
    use hostreg::registry::planner::Strategy;
    use hostreg::registry::Core;
    use proptest::prelude::*;

    fn core_with_hosts(count: usize) -> Core {
        let core = Core::new(Arc::new(MockRuntimeDriver::default()));
        for i in 0..count {
            core.create(&format!("10.0.{}.{}", i / 256, i % 256), 1024 * 1024 * 1024, 2);
        }
        core
    }

    proptest! {
        #[test]
        fn query_results_never_repeat_a_host(
            host_count in 0usize..40,
            utilizations in proptest::collection::vec(0.0f64..1.0, 0..40),
            requested_class in 1u8..=4,
        ) {
            let core = core_with_hosts(host_count);
            for (i, u) in utilizations.iter().enumerate().take(host_count) {
                let ip = format!("10.0.{}.{}", i / 256, i % 256);
                let _ = core.update_both(&ip, *u, *u);
            }

            let class = HostClass::new(requested_class).unwrap();
            for strategy in [Strategy::Normal, Strategy::Cut, Strategy::Kill] {
                let hosts = core.query(strategy, class);
                let mut seen = HashSet::new();
                for host in &hosts {
                    prop_assert!(seen.insert(host.host_ip.clone()), "duplicate host in {:?} query", strategy);
                }
            }
        }

        #[test]
        fn every_created_host_is_reachable_after_updates_quiesce(
            host_count in 1usize..20,
            utilizations in proptest::collection::vec(0.0f64..1.0, 1..20),
        ) {
            let core = core_with_hosts(host_count);
            for (i, u) in utilizations.iter().enumerate().take(host_count) {
                let ip = format!("10.0.{}.{}", i / 256, i % 256);
                let _ = core.update_both(&ip, *u, *u);
            }

            for i in 0..host_count {
                let ip = format!("10.0.{}.{}", i / 256, i % 256);
                prop_assert!(core.lookup(&ip).is_some(), "host {} missing after updates", ip);
            }
        }

        #[test]
        fn tightening_never_increases_class_number(
            host_count in 1usize..10,
            requests in proptest::collection::vec(1u8..=4, 1..30),
        ) {
            let core = core_with_hosts(host_count);
            let ip = "10.0.0.0".to_string();
            let mut tightest = HostClass::LEAST_RESTRICTIVE;

            for r in requests {
                let requested = HostClass::new(r).unwrap();
                let _ = core.update_class(&ip, requested);
                if requested < tightest {
                    tightest = requested;
                }
                let current = core.lookup(&ip).unwrap().host_class;
                prop_assert_eq!(current, tightest);
            }
        }
    }
}
