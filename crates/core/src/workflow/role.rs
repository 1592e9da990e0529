//! Actor roles and approval authority.
//!
//! This module decides whether an actor may take the privileged approval
//! actions (approve, reject, reset approval) on a given entity kind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leasedesk_shared::config::WorkflowConfig;
use leasedesk_shared::types::ActorId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{EntityKind, UnknownStatus};

/// User role in the back-office hierarchy, ordered lowest to highest.
///
/// The engine consults the role only for approval authority: `Approve`,
/// `Reject` and `ResetApproval` need at least the kind's approver role.
/// Every other action is open to any role; gating them is up to the
/// backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Lowest rank.
    Viewer = 0,
    /// Data entry.
    Clerk = 1,
    /// Finance staff.
    Accountant = 2,
    /// Default approver role.
    Manager = 3,
    /// Highest rank.
    Admin = 4,
}

impl UserRole {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Result<Self, UnknownStatus> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "clerk" => Ok(Self::Clerk),
            "accountant" => Ok(Self::Accountant),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownStatus {
                vocabulary: "user role",
                value: s.to_string(),
            }),
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Clerk => "clerk",
            Self::Accountant => "accountant",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user requesting a workflow action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The user's ID.
    pub id: ActorId,
    /// The user's role.
    pub role: UserRole,
    /// Largest amount the user may approve; `None` means no limit.
    pub approval_limit: Option<Decimal>,
}

impl Actor {
    /// Creates an actor without an approval limit.
    #[must_use]
    pub fn new(id: ActorId, role: UserRole) -> Self {
        Self {
            id,
            role,
            approval_limit: None,
        }
    }

    /// Sets the approval limit.
    #[must_use]
    pub fn with_approval_limit(mut self, limit: Decimal) -> Self {
        self.approval_limit = Some(limit);
        self
    }
}

/// Minimum approver role per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalPolicy {
    payment_voucher: UserRole,
    lease_revenue: UserRole,
    termination: UserRole,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            payment_voucher: UserRole::Manager,
            lease_revenue: UserRole::Manager,
            termination: UserRole::Manager,
        }
    }
}

impl ApprovalPolicy {
    /// Builds the policy from configuration.
    pub fn from_config(config: &WorkflowConfig) -> Result<Self, UnknownStatus> {
        Ok(Self {
            payment_voucher: UserRole::parse(&config.payment_voucher_approver)?,
            lease_revenue: UserRole::parse(&config.lease_revenue_approver)?,
            termination: UserRole::parse(&config.termination_approver)?,
        })
    }

    /// Overrides the approver role for one kind.
    #[must_use]
    pub fn with_approver(mut self, kind: EntityKind, role: UserRole) -> Self {
        match kind {
            EntityKind::PaymentVoucher => self.payment_voucher = role,
            EntityKind::LeaseRevenue => self.lease_revenue = role,
            EntityKind::ContractTermination => self.termination = role,
        }
        self
    }

    /// The minimum role for privileged actions on `kind`.
    #[must_use]
    pub fn required_role(&self, kind: EntityKind) -> UserRole {
        match kind {
            EntityKind::PaymentVoucher => self.payment_voucher,
            EntityKind::LeaseRevenue => self.lease_revenue,
            EntityKind::ContractTermination => self.termination,
        }
    }

    /// Check if an actor holds the approver role for `kind`.
    ///
    /// # Returns
    /// * `Ok(())` if the actor may act
    /// * `Err(WorkflowError::InsufficientRole)` if the role is too low
    pub fn authorize(&self, actor: &Actor, kind: EntityKind) -> Result<(), WorkflowError> {
        let required = self.required_role(kind);
        if actor.role < required {
            return Err(WorkflowError::InsufficientRole {
                user_role: actor.role,
                required_role: required,
            });
        }
        Ok(())
    }

    /// Check if an actor may approve an entity carrying `amount`.
    ///
    /// The approval limit only binds an actor whose role is exactly the
    /// required one; higher roles have no limit.
    pub fn authorize_amount(
        &self,
        actor: &Actor,
        kind: EntityKind,
        amount: Option<Decimal>,
    ) -> Result<(), WorkflowError> {
        self.authorize(actor, kind)?;

        if actor.role == self.required_role(kind)
            && let (Some(amount), Some(limit)) = (amount, actor.approval_limit)
            && amount > limit
        {
            return Err(WorkflowError::ExceedsApprovalLimit { amount, limit });
        }

        Ok(())
    }
}
