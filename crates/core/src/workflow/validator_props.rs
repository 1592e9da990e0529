//! Property-based tests for TransitionValidator.
//!
//! These run the validator over the full kind × state × action × approval ×
//! role space using proptest for randomized input generation.

use proptest::prelude::*;

use leasedesk_shared::types::ActorId;

use crate::workflow::entity::WorkflowEntity;
use crate::workflow::error::{RejectionKind, WorkflowError};
use crate::workflow::role::{Actor, ApprovalPolicy, UserRole};
use crate::workflow::types::{
    ApprovalStatus, EntityKey, EntityKind, LifecycleStatus, WorkflowAction,
};
use crate::workflow::validator::{ActionPayload, TransitionValidator};
use crate::workflow::vocabulary::{Resolution, TransitionTable};

fn arb_kind() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ALL.to_vec())
}

fn arb_status() -> impl Strategy<Value = LifecycleStatus> {
    prop::sample::select(LifecycleStatus::ALL.to_vec())
}

fn arb_action() -> impl Strategy<Value = WorkflowAction> {
    prop::sample::select(WorkflowAction::ALL.to_vec())
}

fn arb_approval() -> impl Strategy<Value = Option<ApprovalStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(ApprovalStatus::Pending)),
        Just(Some(ApprovalStatus::Approved)),
        Just(Some(ApprovalStatus::Rejected)),
    ]
}

fn arb_role() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::Viewer),
        Just(UserRole::Clerk),
        Just(UserRole::Accountant),
        Just(UserRole::Manager),
        Just(UserRole::Admin),
    ]
}

/// Strategy for empty or whitespace-only strings.
fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

/// Strategy for non-blank reasons.
fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ]{0,60}"
}

fn entity(
    kind: EntityKind,
    status: LifecycleStatus,
    approval: Option<ApprovalStatus>,
) -> WorkflowEntity {
    WorkflowEntity::new(EntityKey::new(kind, 1_u64), status).with_approval(approval)
}

fn actor(role: UserRole) -> Actor {
    Actor::new(ActorId::new(), role)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Locked entities refuse everything except Reverse and View.
    #[test]
    fn prop_locked_entities_refuse_mutation(
        kind in arb_kind(),
        status in arb_status(),
        action in arb_action(),
        approval in arb_approval(),
        role in arb_role(),
        reason in arb_reason(),
    ) {
        let entity = entity(kind, status, approval);
        prop_assume!(entity.financial_lock());
        prop_assume!(!matches!(action, WorkflowAction::Reverse | WorkflowAction::View));

        let result = TransitionValidator::validate(
            &entity,
            action,
            &actor(role),
            &ActionPayload::with_reason(reason),
            &ApprovalPolicy::default(),
        );

        prop_assert_eq!(result, Err(WorkflowError::Locked { status, action }));
    }

    /// Blank reasons are refused for Reject and Reverse in every state.
    #[test]
    fn prop_blank_reason_is_missing_field(
        kind in arb_kind(),
        status in arb_status(),
        reverse in any::<bool>(),
        approval in arb_approval(),
        role in arb_role(),
        blank in arb_blank(),
    ) {
        let action = if reverse { WorkflowAction::Reverse } else { WorkflowAction::Reject };
        let payload = ActionPayload { reason: Some(blank), comments: Some("see notes".into()) };

        let err = TransitionValidator::validate(
            &entity(kind, status, approval),
            action,
            &actor(role),
            &payload,
            &ApprovalPolicy::default(),
        )
        .unwrap_err();

        prop_assert_eq!(err.kind(), RejectionKind::MissingRequiredField);
    }

    /// Approve and Reject need a pending approval.
    #[test]
    fn prop_decision_without_pending_approval_is_invalid_state(
        kind in arb_kind(),
        status in arb_status(),
        reject in any::<bool>(),
        approval in arb_approval(),
    ) {
        prop_assume!(approval != Some(ApprovalStatus::Pending));
        let entity = entity(kind, status, approval);
        prop_assume!(!entity.financial_lock());
        let action = if reject { WorkflowAction::Reject } else { WorkflowAction::Approve };

        let err = TransitionValidator::validate(
            &entity,
            action,
            &actor(UserRole::Admin),
            &ActionPayload::with_reason("checked"),
            &ApprovalPolicy::default(),
        )
        .unwrap_err();

        prop_assert_eq!(err.kind(), RejectionKind::InvalidState);
    }

    /// Roles below the approver role cannot take privileged actions.
    #[test]
    fn prop_non_approver_is_unauthorized(
        kind in arb_kind(),
        status in arb_status(),
        action in prop_oneof![
            Just(WorkflowAction::Approve),
            Just(WorkflowAction::Reject),
            Just(WorkflowAction::ResetApproval),
        ],
        role in prop_oneof![
            Just(UserRole::Viewer),
            Just(UserRole::Clerk),
            Just(UserRole::Accountant),
        ],
    ) {
        let entity = entity(kind, status, Some(ApprovalStatus::Pending));
        prop_assume!(!entity.financial_lock());

        let err = TransitionValidator::validate(
            &entity,
            action,
            &actor(role),
            &ActionPayload::with_reason("checked"),
            &ApprovalPolicy::default(),
        )
        .unwrap_err();

        prop_assert_eq!(err.kind(), RejectionKind::Unauthorized);
    }

    /// Once the guards pass, the decision is exactly the transition table.
    #[test]
    fn prop_decision_matches_transition_table(
        kind in arb_kind(),
        status in arb_status(),
        action in arb_action(),
        reason in arb_reason(),
    ) {
        let entity = entity(kind, status, Some(ApprovalStatus::Pending));
        prop_assume!(
            !entity.financial_lock()
                || matches!(action, WorkflowAction::Reverse | WorkflowAction::View)
        );

        let result = TransitionValidator::validate(
            &entity,
            action,
            &actor(UserRole::Admin),
            &ActionPayload::with_reason(reason),
            &ApprovalPolicy::default(),
        );

        match TransitionTable::lookup(kind, status, action) {
            None => prop_assert_eq!(
                result,
                Err(WorkflowError::InvalidTransition { kind, from: status, action })
            ),
            Some(to) => {
                let permit = result.unwrap();
                prop_assert_eq!(permit.to, to);
                prop_assert_eq!(permit.from, status);
                prop_assert_eq!(permit.action, action);
            }
        }
    }

    /// Terminal states never lead anywhere else.
    #[test]
    fn prop_terminal_states_are_final(
        kind in arb_kind(),
        action in arb_action(),
        status in prop_oneof![
            Just(LifecycleStatus::Reversed),
            Just(LifecycleStatus::Cancelled),
            Just(LifecycleStatus::Completed),
        ],
        reason in arb_reason(),
    ) {
        let result = TransitionValidator::validate(
            &entity(kind, status, Some(ApprovalStatus::Approved)),
            action,
            &actor(UserRole::Admin),
            &ActionPayload::with_reason(reason),
            &ApprovalPolicy::default(),
        );

        if let Ok(permit) = result {
            prop_assert_eq!(permit.action, WorkflowAction::View);
            prop_assert_eq!(permit.to, Resolution::Status(status));
        }
    }
}
