//! Registry activity is visible through the process-wide metrics registry.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use idr_registry::{Claim, IdentityRegistryApi};
    use idr_telemetry::{encode_metrics, register_metrics, REGISTRY_OPERATIONS, REGISTRY_REJECTIONS};

    #[test]
    fn test_operations_and_rejections_are_counted() {
        register_metrics().unwrap();
        let mut h = Harness::new();
        let identity = account(80);

        let applied = REGISTRY_OPERATIONS.with_label_values(&["change_owner", "direct"]);
        let rejected = REGISTRY_REJECTIONS.with_label_values(&["change_owner", "bad_actor"]);
        let applied_before = applied.get();
        let rejected_before = rejected.get();

        h.registry
            .change_owner(identity, account(81), Claim::direct(identity))
            .unwrap();
        let _ = h
            .registry
            .change_owner(identity, account(82), Claim::direct(identity));

        // Other tests share the counters; they only ever grow
        assert!(applied.get() >= applied_before + 1.0);
        assert!(rejected.get() >= rejected_before + 1.0);

        let text = encode_metrics().unwrap();
        assert!(text.contains("idr_registry_operations_total"));
        assert!(text.contains("idr_registry_rejections_total"));
    }
}
