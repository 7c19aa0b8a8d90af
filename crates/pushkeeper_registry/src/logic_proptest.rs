#[cfg(test)]
mod tests {
    use crate::logic::{reconcile, upsert};
    use pushkeeper_common::models::{DeliveryOutcome, DeliveryReport, DeviceTokenEntry};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn outcome_strategy() -> impl Strategy<Value = DeliveryOutcome> {
        prop_oneof![
            Just(DeliveryOutcome::Accepted),
            Just(DeliveryOutcome::PermanentlyInvalid),
            Just(DeliveryOutcome::TransientError),
        ]
    }

    // A registry with distinct devices, each paired with an outcome
    fn registry_strategy() -> impl Strategy<Value = Vec<(DeviceTokenEntry, DeliveryOutcome)>> {
        prop::collection::vec(outcome_strategy(), 0..8).prop_map(|outcomes| {
            outcomes
                .into_iter()
                .enumerate()
                .map(|(i, outcome)| {
                    (
                        DeviceTokenEntry::new(format!("device-{}", i), format!("token-{}", i)),
                        outcome,
                    )
                })
                .collect()
        })
    }

    fn split(
        registry: &[(DeviceTokenEntry, DeliveryOutcome)],
    ) -> (Vec<DeviceTokenEntry>, Vec<DeliveryReport>) {
        let tokens = registry.iter().map(|(e, _)| e.clone()).collect();
        let reports = registry
            .iter()
            .map(|(e, o)| DeliveryReport::new(e.device.clone(), e.token.clone(), *o))
            .collect();
        (tokens, reports)
    }

    proptest! {
        #[test]
        fn test_upsert_never_duplicates_devices(
            ops in prop::collection::vec((0..4usize, 0..100u32), 0..30),
        ) {
            let mut tokens = Vec::new();
            for (device, token) in ops {
                tokens = upsert(
                    &tokens,
                    DeviceTokenEntry::new(format!("device-{}", device), format!("t{}", token)),
                );
                let devices: HashSet<&str> = tokens.iter().map(|e| e.device.as_str()).collect();
                prop_assert_eq!(devices.len(), tokens.len());
            }
        }

        #[test]
        fn test_upsert_holds_the_new_token(
            ops in prop::collection::vec((0..4usize, 0..100u32), 1..30),
        ) {
            let mut tokens = Vec::new();
            for (device, token) in &ops {
                let device = format!("device-{}", device);
                let token = format!("t{}", token);
                tokens = upsert(&tokens, DeviceTokenEntry::new(device.clone(), token.clone()));
                let stored = tokens.iter().find(|e| e.device == device).map(|e| e.token.clone());
                prop_assert_eq!(stored, Some(token));
            }
        }

        #[test]
        fn test_reconcile_removes_exactly_permanent(
            registry in registry_strategy(),
            push_enabled in any::<bool>(),
        ) {
            let (tokens, reports) = split(&registry);
            let result = reconcile(&tokens, &reports, push_enabled);

            for (entry, outcome) in &registry {
                let kept = result.tokens.contains(entry);
                match outcome {
                    DeliveryOutcome::PermanentlyInvalid => prop_assert!(!kept),
                    DeliveryOutcome::Accepted | DeliveryOutcome::TransientError => prop_assert!(kept),
                }
            }
            prop_assert_eq!(result.tokens.len() + result.removed.len(), tokens.len());
        }

        #[test]
        fn test_reconcile_flag_rule(
            registry in registry_strategy(),
            push_enabled in any::<bool>(),
        ) {
            let (tokens, reports) = split(&registry);
            let result = reconcile(&tokens, &reports, push_enabled);

            if result.tokens.is_empty() {
                prop_assert!(!result.push_enabled);
            } else {
                prop_assert_eq!(result.push_enabled, push_enabled);
            }
        }

        #[test]
        fn test_reconcile_ignores_outcome_order(
            registry in registry_strategy(),
            push_enabled in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let (tokens, reports) = split(&registry);
            let mut shuffled = reports.clone();
            // deterministic permutation from the seed
            if !shuffled.is_empty() {
                let len = shuffled.len();
                shuffled.rotate_left((seed as usize) % len);
                if seed % 2 == 0 {
                    shuffled.reverse();
                }
            }

            prop_assert_eq!(
                reconcile(&tokens, &reports, push_enabled),
                reconcile(&tokens, &shuffled, push_enabled)
            );
        }

        #[test]
        fn test_reconcile_is_idempotent(
            registry in registry_strategy(),
            push_enabled in any::<bool>(),
        ) {
            let (tokens, reports) = split(&registry);
            let once = reconcile(&tokens, &reports, push_enabled);
            let twice = reconcile(&once.tokens, &reports, once.push_enabled);

            prop_assert_eq!(&twice.tokens, &once.tokens);
            prop_assert_eq!(twice.push_enabled, once.push_enabled);
            prop_assert!(twice.removed.is_empty());
        }
    }
}
