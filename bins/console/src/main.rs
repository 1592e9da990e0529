//! Leasedesk operator console
//!
//! Loads one entity from the back-office API, shows what a role may do with
//! it, and runs workflow actions through the executor.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use leasedesk_client::HttpWorkflowRemote;
use leasedesk_core::workflow::{
    ActionMenu, ApprovalPolicy, EntityStore, StatusBadge, TransitionOutcome, TransitionRequest,
    WorkflowEntity, WorkflowExecutor, notification_message,
};
use leasedesk_shared::AppConfig;
use leasedesk_shared::config::LoggingConfig;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let policy = ApprovalPolicy::from_config(&config.workflow)?;
    let remote = Arc::new(HttpWorkflowRemote::from_config(&config.remote)?);
    info!(base_url = %config.remote.base_url, "Workflow backend configured");

    match cli.command {
        Command::Show { target, actor } => {
            let entity = remote.fetch(&target.key()).await?;
            let menu = ActionMenu::build(&entity, &actor.actor(), &policy, false);
            print_snapshot(&entity, Some(&menu), cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            target,
            action,
            actor,
            reason,
            comments,
        } => {
            let key = target.key();
            let store = Arc::new(EntityStore::new());
            store.load(remote.fetch(&key).await?);

            let executor = WorkflowExecutor::new(remote, Arc::clone(&store), policy);
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted; the pending result will be discarded");
                    on_interrupt.cancel();
                }
            });

            let request = TransitionRequest {
                key,
                action,
                actor: actor.actor(),
                payload: cli::payload(reason, comments),
            };
            match executor.execute(request, &cancel).await {
                Ok(TransitionOutcome::Committed(snapshot)) => {
                    print_snapshot(&snapshot, None, cli.json)?;
                    Ok(ExitCode::SUCCESS)
                }
                Ok(TransitionOutcome::Deleted(key)) => {
                    println!("Deleted {key}");
                    Ok(ExitCode::SUCCESS)
                }
                Ok(TransitionOutcome::Discarded { snapshot, reason }) => {
                    println!(
                        "The server accepted the action but the result was discarded ({reason:?}); now {}",
                        snapshot.lifecycle_status
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{}", notification_message(&err));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.filter.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn print_snapshot(
    entity: &WorkflowEntity,
    menu: Option<&ActionMenu>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({ "entity": entity, "actions": menu });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let badge = StatusBadge::for_status(entity.lifecycle_status);
    println!("{}  [{}]  v{}", entity.key, badge.label, entity.version);
    if let Some(approval) = entity.approval_status {
        println!("  approval: {approval}");
    }
    if let Some(amount) = entity.amount {
        println!("  amount:   {amount}");
    }
    if let Some(menu) = menu {
        for item in &menu.items {
            match item.blocked_by {
                None => println!("  + {}", item.action),
                Some(kind) => println!("  - {} ({kind})", item.action),
            }
        }
    }
    Ok(())
}
