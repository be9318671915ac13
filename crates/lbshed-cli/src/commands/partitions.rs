//! Partition command handlers.

use tabled::Tabled;

use lbshed_core::Environment;

use crate::cli::{GlobalOpts, PartitionsArgs, PartitionsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PartitionRow {
    #[tabled(rename = "Partition")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
}

pub async fn handle(
    environment: &Environment,
    args: PartitionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PartitionsCommand::List => {
            let conn = environment.find_active_device().await?;
            let active = conn.active_partition().to_owned();
            let partitions = conn.list_partitions().await?;

            let out = output::render_list(
                &global.output,
                &partitions,
                |name| PartitionRow {
                    name: name.clone(),
                    active: if *name == active { "*".into() } else { String::new() },
                },
                Clone::clone,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
