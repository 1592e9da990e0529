//! Command-line definitions.

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use leasedesk_core::workflow::{
    ActionPayload, Actor, EntityKey, EntityKind, UserRole, WorkflowAction,
};
use leasedesk_shared::types::{ActorId, EntityId};

/// Leasedesk operator console.
#[derive(Debug, Parser)]
#[command(
    name = "leasedesk",
    about = "Leasedesk workflow console",
    long_about = "Inspect payment vouchers, lease revenue postings and contract terminations, and run workflow actions against the back-office API.",
    after_help = "Examples:\n  leasedesk show payment-voucher 1042 --role manager\n  leasedesk run payment-voucher 1042 approve --role manager --comments \"ok\"\n  leasedesk run lease-revenue 77 reverse --role accountant --reason \"duplicate\""
)]
pub struct Cli {
    /// Emit machine-readable JSON output.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show an entity's status and the actions available to a role.
    Show {
        #[command(flatten)]
        target: Target,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Run one workflow action.
    Run {
        #[command(flatten)]
        target: Target,
        /// Action to run (submit, approve, reject, reset-approval, post, reverse, cancel, complete, delete).
        #[arg(value_parser = parse_action)]
        action: WorkflowAction,
        #[command(flatten)]
        actor: ActorArgs,
        /// Reason, required for reject and reverse.
        #[arg(long)]
        reason: Option<String>,
        /// Optional comments.
        #[arg(long)]
        comments: Option<String>,
    },
}

/// Which entity to act on.
#[derive(Debug, Args)]
pub struct Target {
    /// Entity kind (payment-voucher, lease-revenue, contract-termination).
    #[arg(value_parser = parse_kind)]
    pub kind: EntityKind,
    /// Entity ID.
    pub id: EntityId,
}

impl Target {
    /// The store key.
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.id.clone())
    }
}

/// Who is acting.
#[derive(Debug, Args)]
pub struct ActorArgs {
    /// Role of the acting user; decides approval authority only.
    #[arg(long, value_parser = parse_role, default_value = "viewer")]
    pub role: UserRole,
    /// ID of the acting user; a fresh one is generated when omitted.
    #[arg(long)]
    pub actor: Option<ActorId>,
    /// Approval limit of the acting user.
    #[arg(long)]
    pub limit: Option<Decimal>,
}

impl ActorArgs {
    pub fn actor(&self) -> Actor {
        let actor = Actor::new(self.actor.unwrap_or_default(), self.role);
        match self.limit {
            Some(limit) => actor.with_approval_limit(limit),
            None => actor,
        }
    }
}

pub fn payload(reason: Option<String>, comments: Option<String>) -> ActionPayload {
    ActionPayload { reason, comments }
}

fn parse_kind(s: &str) -> Result<EntityKind, String> {
    EntityKind::parse(s).map_err(|e| e.to_string())
}

fn parse_action(s: &str) -> Result<WorkflowAction, String> {
    WorkflowAction::parse(s).map_err(|e| e.to_string())
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    UserRole::parse(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "leasedesk",
            "run",
            "payment-voucher",
            "1042",
            "reject",
            "--role",
            "manager",
            "--reason",
            "wrong vendor",
        ])
        .unwrap();

        let Command::Run {
            target,
            action,
            actor,
            reason,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(target.key().to_string(), "payment_voucher/1042");
        assert_eq!(action, WorkflowAction::Reject);
        assert_eq!(actor.role, UserRole::Manager);
        assert_eq!(reason.as_deref(), Some("wrong vendor"));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = Cli::try_parse_from(["leasedesk", "run", "lease-revenue", "7", "archive"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_show_defaults_to_viewer() {
        let cli = Cli::try_parse_from(["leasedesk", "show", "termination", "5", "--json"]).unwrap();
        assert!(cli.json);
        let Command::Show { target, actor } = cli.command else {
            panic!("expected show");
        };
        assert_eq!(target.kind, EntityKind::ContractTermination);
        assert_eq!(actor.role, UserRole::Viewer);
    }
}
