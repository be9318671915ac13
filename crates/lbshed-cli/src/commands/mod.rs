//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod environments;
pub mod failover;
pub mod nodes;
pub mod partitions;
pub mod util;

use lbshed_core::Environment;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    environment: &Environment,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Nodes(args) => nodes::handle(environment, args, global).await,
        Command::Failover(args) => failover::handle(environment, args, global).await,
        Command::Partitions(args) => partitions::handle(environment, args, global).await,
        // Environments, Config, and Completions are handled before dispatch
        Command::Environments(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
