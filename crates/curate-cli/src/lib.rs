//! # curate-cli: Command-Line Front End
//!
//! Provides the `curate` binary over the curation libraries.
//!
//! ## Subcommands
//!
//! - `curate validate <kind> <file>`: strict model validation.
//! - `curate qa <file>`: structural QA audit.
//! - `curate upload | edit | approve | show | list`: the record workflow
//!   over a directory-backed record store.
//! - `curate export <id>`: render a stored record as JSON, YAML or HTML.
//!
//! ## Exit codes
//!
//! `0` on success, `1` when the input was refused (invalid metadata,
//! failed audit, missing permission, invalid transition), `2` on any
//! other error.

pub mod export;
pub mod qa;
pub mod record;
pub mod settings;
pub mod validate;

use anyhow::Result;
use clap::Args;

use curate_config::ConfigError;
use curate_state::{Role, User, WorkflowError};

pub use settings::Settings;

/// Identity asserted for workflow commands.
#[derive(Args, Debug, Clone)]
pub struct ActorArgs {
    /// Acting username.
    #[arg(long)]
    pub user: String,

    /// Role of the acting user: uploader or approver.
    #[arg(long, default_value = "uploader")]
    pub role: Role,
}

impl ActorArgs {
    /// The asserted user.
    pub fn user(&self) -> User {
        User::new(self.user.clone(), self.role)
    }
}

/// Report a refusal and map it to exit code 1. Anything else is passed
/// on as an operational error.
pub(crate) fn refusal(err: WorkflowError) -> Result<u8> {
    match err {
        e @ (WorkflowError::PermissionDenied { .. }
        | WorkflowError::InvalidTransition { .. }
        | WorkflowError::Config(
            ConfigError::Validation(_)
            | ConfigError::UnknownField { .. }
            | ConfigError::FileNotFound { .. }
            | ConfigError::InvalidValue { .. },
        )) => {
            println!("FAIL: {e}");
            Ok(1)
        }
        other => Err(other.into()),
    }
}
