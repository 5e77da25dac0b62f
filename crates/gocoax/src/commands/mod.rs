//! Command dispatch: bridges CLI args -> adapter client -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod status;
pub mod watch;

use gocoax_core::AdapterClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an adapter-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &AdapterClient,
    global: &GlobalOpts,
    default_interval: u64,
) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(client, &args, global).await,
        Command::Watch(args) => watch::handle(client, &args, global, default_interval).await,
        Command::Check => check::handle(client, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need an adapter connection".into(),
        )),
    }
}
