#[cfg(test)]
mod tests {
    use crate::logic::{reconcile, remove_device, upsert};
    use pushkeeper_common::models::{DeliveryOutcome, DeliveryReport, DeviceTokenEntry};

    fn entry(device: &str, token: &str) -> DeviceTokenEntry {
        DeviceTokenEntry::new(device, token)
    }

    fn report(device: &str, token: &str, outcome: DeliveryOutcome) -> DeliveryReport {
        DeliveryReport::new(device, token, outcome)
    }

    fn pairs(tokens: &[DeviceTokenEntry]) -> Vec<(&str, &str)> {
        tokens
            .iter()
            .map(|e| (e.device.as_str(), e.token.as_str()))
            .collect()
    }

    #[test]
    fn test_permanent_entry_removed_flag_unchanged() {
        let tokens = vec![entry("A", "t1"), entry("B", "t2")];
        let outcomes = vec![
            report("A", "t1", DeliveryOutcome::PermanentlyInvalid),
            report("B", "t2", DeliveryOutcome::Accepted),
        ];

        let result = reconcile(&tokens, &outcomes, true);

        assert_eq!(pairs(&result.tokens), vec![("B", "t2")]);
        assert!(result.push_enabled);
        assert_eq!(pairs(&result.removed), vec![("A", "t1")]);
        assert!(result.changed());
    }

    #[test]
    fn test_last_entry_removed_disables_push() {
        let tokens = vec![entry("A", "t1")];
        let outcomes = vec![report("A", "t1", DeliveryOutcome::PermanentlyInvalid)];

        let result = reconcile(&tokens, &outcomes, true);

        assert!(result.tokens.is_empty());
        assert!(!result.push_enabled);
    }

    #[test]
    fn test_upsert_replaces_instead_of_appending() {
        let tokens = vec![entry("A", "t1")];
        let updated = upsert(&tokens, entry("A", "t2"));
        assert_eq!(pairs(&updated), vec![("A", "t2")]);
    }

    #[test]
    fn test_transient_and_accepted_are_kept() {
        let tokens = vec![entry("A", "t1"), entry("B", "t2")];
        let outcomes = vec![
            report("A", "t1", DeliveryOutcome::TransientError),
            report("B", "t2", DeliveryOutcome::Accepted),
        ];

        let result = reconcile(&tokens, &outcomes, true);

        assert_eq!(result.tokens, tokens);
        assert!(result.push_enabled);
        assert!(!result.changed());
    }

    #[test]
    fn test_disabled_flag_stays_disabled() {
        let tokens = vec![entry("A", "t1")];
        let result = reconcile(&tokens, &[], false);
        assert_eq!(result.tokens, tokens);
        assert!(!result.push_enabled);
    }

    #[test]
    fn test_empty_input_disables_push() {
        let result = reconcile(&[], &[], true);
        assert!(!result.push_enabled);
    }

    #[test]
    fn test_entry_without_outcome_is_kept() {
        let tokens = vec![entry("A", "t1"), entry("B", "t2")];
        let outcomes = vec![report("A", "t1", DeliveryOutcome::PermanentlyInvalid)];

        let result = reconcile(&tokens, &outcomes, true);

        assert_eq!(pairs(&result.tokens), vec![("B", "t2")]);
    }

    #[test]
    fn test_report_for_rotated_token_removes_nothing() {
        // Android re-registered with t-new while t-old was being rejected
        let tokens = vec![entry("iPhone", "t1"), entry("Android", "t-new")];
        let outcomes = vec![report(
            "Android",
            "t-old",
            DeliveryOutcome::PermanentlyInvalid,
        )];

        let result = reconcile(&tokens, &outcomes, true);

        assert_eq!(result.tokens, tokens);
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let tokens = vec![entry("A", "t1"), entry("B", "t2"), entry("C", "t3")];
        let outcomes = vec![
            report("C", "t3", DeliveryOutcome::Accepted),
            report("B", "t2", DeliveryOutcome::PermanentlyInvalid),
            report("A", "t1", DeliveryOutcome::TransientError),
        ];

        let result = reconcile(&tokens, &outcomes, true);

        assert_eq!(pairs(&result.tokens), vec![("A", "t1"), ("C", "t3")]);
    }

    #[test]
    fn test_upsert_appends_new_device() {
        let tokens = vec![entry("iPhone", "t1")];
        let updated = upsert(&tokens, entry("Mac", "t2"));
        assert_eq!(pairs(&updated), vec![("iPhone", "t1"), ("Mac", "t2")]);
    }

    #[test]
    fn test_upsert_keeps_position_and_drops_duplicates() {
        let tokens = vec![
            entry("iPhone", "t1"),
            entry("Mac", "t2"),
            entry("iPhone", "t3"),
        ];
        let updated = upsert(&tokens, entry("iPhone", "t4"));
        assert_eq!(pairs(&updated), vec![("iPhone", "t4"), ("Mac", "t2")]);
    }

    #[test]
    fn test_remove_device() {
        let tokens = vec![entry("A", "t1"), entry("B", "t2"), entry("C", "t3")];
        let updated = remove_device(&tokens, "B");
        assert_eq!(pairs(&updated), vec![("A", "t1"), ("C", "t3")]);

        let unchanged = remove_device(&updated, "Z");
        assert_eq!(unchanged, updated);
    }
}
