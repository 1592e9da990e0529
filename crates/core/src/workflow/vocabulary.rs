//! Per-kind transition tables.
//!
//! The tables are exhaustive: a `(state, action)` pair that is not listed
//! here is illegal. `Edit` and `View` resolve to the current state and
//! `Delete` resolves to [`Resolution::Removed`].
//!
//! Payment vouchers:
//! - Draft → Pending (submit), Cancelled (cancel)
//! - Pending → Approved (approve), Rejected (reject), Cancelled (cancel)
//! - Approved → Paid (post), Reversed (reverse), Pending (reset approval)
//! - Rejected → Pending (reset approval), Cancelled (cancel)
//! - Paid → Reversed (reverse)
//!
//! Lease revenue postings:
//! - Draft → Pending (submit), Cancelled (cancel)
//! - Pending → Posted (post), Cancelled (cancel)
//! - Posted → Reversed (reverse)
//!
//! Contract terminations:
//! - Draft → Pending (submit), Cancelled (cancel)
//! - Pending → Approved (approve), Rejected (reject), Cancelled (cancel)
//! - Approved → Completed (complete), Pending (reset approval), Cancelled (cancel)
//! - Rejected → Pending (reset approval), Cancelled (cancel)

use serde::Serialize;
use std::fmt;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalStatus, EntityKind, LifecycleStatus, WorkflowAction};

/// Where a legal action leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "status")]
pub enum Resolution {
    /// The entity moves to (or stays in) this lifecycle status.
    Status(LifecycleStatus),
    /// The entity is deleted.
    Removed,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "{status}"),
            Self::Removed => f.write_str("removed"),
        }
    }
}

/// Stateless lookup over the transition tables.
pub struct TransitionTable;

impl TransitionTable {
    /// Returns where `action` leads from `from`, or `None` if it is illegal.
    #[must_use]
    pub fn lookup(
        kind: EntityKind,
        from: LifecycleStatus,
        action: WorkflowAction,
    ) -> Option<Resolution> {
        use LifecycleStatus as S;
        use WorkflowAction as A;

        if action == A::View {
            return Some(Resolution::Status(from));
        }
        if from.is_editable() {
            match action {
                A::Edit => return Some(Resolution::Status(from)),
                A::Delete => return Some(Resolution::Removed),
                A::Cancel => return Some(Resolution::Status(S::Cancelled)),
                _ => {}
            }
        }

        let to = match (kind, from, action) {
            (_, S::Draft, A::Submit) => S::Pending,

            (
                EntityKind::PaymentVoucher | EntityKind::ContractTermination,
                S::Pending,
                A::Approve,
            ) => S::Approved,
            (
                EntityKind::PaymentVoucher | EntityKind::ContractTermination,
                S::Pending,
                A::Reject,
            ) => S::Rejected,
            (
                EntityKind::PaymentVoucher | EntityKind::ContractTermination,
                S::Approved | S::Rejected,
                A::ResetApproval,
            ) => S::Pending,
            (
                EntityKind::PaymentVoucher | EntityKind::ContractTermination,
                S::Rejected,
                A::Cancel,
            ) => S::Cancelled,

            (EntityKind::PaymentVoucher, S::Approved, A::Post) => S::Paid,
            (EntityKind::PaymentVoucher, S::Approved | S::Paid, A::Reverse) => S::Reversed,

            (EntityKind::LeaseRevenue, S::Pending, A::Post) => S::Posted,
            (EntityKind::LeaseRevenue, S::Posted, A::Reverse) => S::Reversed,

            (EntityKind::ContractTermination, S::Approved, A::Complete) => S::Completed,
            (EntityKind::ContractTermination, S::Approved, A::Cancel) => S::Cancelled,

            _ => return None,
        };
        Some(Resolution::Status(to))
    }

    /// Resolves the next state, or fails with `InvalidTransition`.
    pub fn next_state(
        kind: EntityKind,
        from: LifecycleStatus,
        action: WorkflowAction,
    ) -> Result<Resolution, WorkflowError> {
        Self::lookup(kind, from, action).ok_or(WorkflowError::InvalidTransition {
            kind,
            from,
            action,
        })
    }

    /// Returns true if no transition leaves `status`.
    #[must_use]
    pub fn is_terminal(status: LifecycleStatus) -> bool {
        status.is_terminal()
    }

    /// Actions with a table entry from `from`, in menu order.
    #[must_use]
    pub fn allowed_actions(kind: EntityKind, from: LifecycleStatus) -> Vec<WorkflowAction> {
        WorkflowAction::ALL
            .into_iter()
            .filter(|action| Self::lookup(kind, from, *action).is_some())
            .collect()
    }

    /// Approval status after `action` commits.
    #[must_use]
    pub fn approval_after(
        kind: EntityKind,
        action: WorkflowAction,
        current: Option<ApprovalStatus>,
    ) -> Option<ApprovalStatus> {
        match action {
            WorkflowAction::Submit | WorkflowAction::ResetApproval if kind.requires_approval() => {
                Some(ApprovalStatus::Pending)
            }
            WorkflowAction::Approve => Some(ApprovalStatus::Approved),
            WorkflowAction::Reject => Some(ApprovalStatus::Rejected),
            _ => current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use EntityKind::{ContractTermination, LeaseRevenue, PaymentVoucher};
    use LifecycleStatus as S;
    use WorkflowAction as A;

    #[rstest]
    #[case(PaymentVoucher, S::Draft, A::Submit, S::Pending)]
    #[case(PaymentVoucher, S::Pending, A::Approve, S::Approved)]
    #[case(PaymentVoucher, S::Pending, A::Reject, S::Rejected)]
    #[case(PaymentVoucher, S::Approved, A::Post, S::Paid)]
    #[case(PaymentVoucher, S::Approved, A::Reverse, S::Reversed)]
    #[case(PaymentVoucher, S::Paid, A::Reverse, S::Reversed)]
    #[case(PaymentVoucher, S::Rejected, A::ResetApproval, S::Pending)]
    #[case(LeaseRevenue, S::Pending, A::Post, S::Posted)]
    #[case(LeaseRevenue, S::Posted, A::Reverse, S::Reversed)]
    #[case(LeaseRevenue, S::Draft, A::Cancel, S::Cancelled)]
    #[case(ContractTermination, S::Approved, A::Complete, S::Completed)]
    #[case(ContractTermination, S::Approved, A::Cancel, S::Cancelled)]
    fn test_listed_transitions(
        #[case] kind: EntityKind,
        #[case] from: LifecycleStatus,
        #[case] action: WorkflowAction,
        #[case] to: LifecycleStatus,
    ) {
        assert_eq!(
            TransitionTable::lookup(kind, from, action),
            Some(Resolution::Status(to))
        );
    }

    #[rstest]
    #[case(PaymentVoucher, S::Draft, A::Approve)]
    #[case(PaymentVoucher, S::Pending, A::Post)]
    #[case(PaymentVoucher, S::Posted, A::Reverse)]
    #[case(LeaseRevenue, S::Pending, A::Approve)]
    #[case(LeaseRevenue, S::Draft, A::Post)]
    #[case(ContractTermination, S::Approved, A::Reverse)]
    #[case(ContractTermination, S::Approved, A::Post)]
    fn test_unlisted_transitions(
        #[case] kind: EntityKind,
        #[case] from: LifecycleStatus,
        #[case] action: WorkflowAction,
    ) {
        assert_eq!(TransitionTable::lookup(kind, from, action), None);
        assert!(matches!(
            TransitionTable::next_state(kind, from, action),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_edit_and_delete_only_from_draft_or_pending() {
        for kind in EntityKind::ALL {
            for status in LifecycleStatus::ALL {
                let editable = matches!(status, S::Draft | S::Pending);
                assert_eq!(
                    TransitionTable::lookup(kind, status, A::Edit).is_some(),
                    editable,
                    "{kind} {status} edit"
                );
                assert_eq!(
                    TransitionTable::lookup(kind, status, A::Delete),
                    editable.then_some(Resolution::Removed),
                    "{kind} {status} delete"
                );
            }
        }
    }

    #[test]
    fn test_approve_and_reject_only_from_pending() {
        for kind in EntityKind::ALL {
            for status in LifecycleStatus::ALL {
                if status == S::Pending && kind.requires_approval() {
                    continue;
                }
                assert_eq!(TransitionTable::lookup(kind, status, A::Approve), None);
                assert_eq!(TransitionTable::lookup(kind, status, A::Reject), None);
            }
        }
    }

    #[test]
    fn test_terminal_states_only_allow_view() {
        for kind in EntityKind::ALL {
            for status in [S::Reversed, S::Cancelled, S::Completed] {
                assert!(TransitionTable::is_terminal(status));
                assert_eq!(
                    TransitionTable::allowed_actions(kind, status),
                    vec![A::View]
                );
            }
        }
    }

    #[test]
    fn test_allowed_actions_for_pending_voucher() {
        assert_eq!(
            TransitionTable::allowed_actions(PaymentVoucher, S::Pending),
            vec![A::View, A::Edit, A::Approve, A::Reject, A::Cancel, A::Delete]
        );
    }

    #[test]
    fn test_approval_after() {
        assert_eq!(
            TransitionTable::approval_after(PaymentVoucher, A::Submit, None),
            Some(ApprovalStatus::Pending)
        );
        assert_eq!(
            TransitionTable::approval_after(LeaseRevenue, A::Submit, None),
            None
        );
        assert_eq!(
            TransitionTable::approval_after(
                ContractTermination,
                A::Reject,
                Some(ApprovalStatus::Pending)
            ),
            Some(ApprovalStatus::Rejected)
        );
        assert_eq!(
            TransitionTable::approval_after(
                PaymentVoucher,
                A::Post,
                Some(ApprovalStatus::Approved)
            ),
            Some(ApprovalStatus::Approved)
        );
    }
}
