//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Workflow backend configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Approval policy configuration.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workflow backend (REST API) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the back-office API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Minimum role allowed to approve, reject, or reset approval, per entity kind.
///
/// Roles are kept as strings here and parsed by the workflow engine.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Approver role for payment vouchers.
    #[serde(default = "default_approver")]
    pub payment_voucher_approver: String,
    /// Approver role for lease revenue postings.
    #[serde(default = "default_approver")]
    pub lease_revenue_approver: String,
    /// Approver role for contract terminations.
    #[serde(default = "default_approver")]
    pub termination_approver: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            payment_voucher_approver: default_approver(),
            lease_revenue_approver: default_approver(),
            termination_approver: default_approver(),
        }
    }
}

fn default_approver() -> String {
    "manager".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "leasedesk=info".to_string()
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default`, `config/{RUN_MODE}`, then `LEASEDESK__SECTION__KEY`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEASEDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
