//! Property-based tests for the record state machines
//!
//! Verifies that the repair edge set is exactly the five defined edges over
//! every status/action pair, and that invoice issuance accepts precisely
//! the positive amounts.

use garage_workflow::error::LifecycleError;
use garage_workflow::invoice::Invoice;
use garage_workflow::repair::{RepairAction, RepairStatus};
use proptest::prelude::*;

// PROPERTY TEST STRATEGIES

fn status_strategy() -> impl Strategy<Value = RepairStatus> {
    prop::sample::select(vec![
        RepairStatus::Pending,
        RepairStatus::Accepted,
        RepairStatus::Rejected,
        RepairStatus::InProgress,
        RepairStatus::Completed,
    ])
}

fn action_strategy() -> impl Strategy<Value = RepairAction> {
    prop::sample::select(vec![
        RepairAction::Accept,
        RepairAction::Reject,
        RepairAction::Progress,
        RepairAction::Complete,
    ])
}

/// The complete edge table the lifecycle promises.
fn expected_edge(status: RepairStatus, action: RepairAction) -> Option<RepairStatus> {
    match (status, action) {
        (RepairStatus::Pending, RepairAction::Accept) => Some(RepairStatus::Accepted),
        (RepairStatus::Pending, RepairAction::Reject) => Some(RepairStatus::Rejected),
        (RepairStatus::Pending, RepairAction::Progress) => Some(RepairStatus::InProgress),
        (RepairStatus::Accepted, RepairAction::Complete)
        | (RepairStatus::InProgress, RepairAction::Complete) => Some(RepairStatus::Completed),
        _ => None,
    }
}

// PROPERTY TESTS
proptest! {
    /// Property: `apply` agrees with the edge table on every pair, so no
    /// undeclared transition can ever sneak in.
    #[test]
    fn prop_apply_matches_the_edge_table(
        status in status_strategy(),
        action in action_strategy()
    ) {
        prop_assert_eq!(status.apply(action), expected_edge(status, action));
    }

    /// Property: terminal statuses accept no action whatsoever.
    #[test]
    fn prop_terminal_statuses_are_dead_ends(action in action_strategy()) {
        prop_assert_eq!(RepairStatus::Rejected.apply(action), None);
        prop_assert_eq!(RepairStatus::Completed.apply(action), None);
    }

    /// Property: every status reached by an edge offers only affordances
    /// that the edge table actually honors from there.
    #[test]
    fn prop_offered_actions_stay_within_the_edge_table(status in status_strategy()) {
        if status != RepairStatus::Pending {
            for action in status.offered_actions() {
                prop_assert!(
                    expected_edge(status, *action).is_some(),
                    "{:?} offers {:?} which is not an edge",
                    status, action
                );
            }
        }
    }

    /// Property: any positive amount issues an invoice carrying exactly
    /// that amount; zero is always rejected.
    #[test]
    fn prop_positive_amounts_issue(amount in 1u64..=100_000_000u64) {
        let invoice = Invoice::new(
            "mech1".into(),
            "client1".into(),
            "Banshee".into(),
            "engine work".into(),
            amount,
        );

        prop_assert!(invoice.is_ok());
        prop_assert_eq!(invoice.unwrap().amount, amount);
    }

    /// Property: the amount guard never lets zero through, whatever the
    /// other fields are.
    #[test]
    fn prop_zero_amount_never_issues(
        vehicle in "[A-Za-z ]{1,20}",
        description in "[A-Za-z ]{1,40}"
    ) {
        let invoice = Invoice::new(
            "mech1".into(),
            "client1".into(),
            vehicle,
            description,
            0,
        );

        prop_assert!(matches!(invoice, Err(LifecycleError::InvalidAmount)));
    }
}
