//! Node command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use lbshed_core::{Environment, NodeStatusRecord, SessionState};

use crate::cli::{GlobalOpts, NodesArgs, NodesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "FQDN")]
    fqdn: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn to_row(record: &NodeStatusRecord, color: bool) -> NodeRow {
    let status = if color {
        match record.status {
            SessionState::Enabled => record.status.to_string().green().to_string(),
            SessionState::Disabled => record.status.to_string().red().to_string(),
        }
    } else {
        record.status.to_string()
    };

    NodeRow {
        node: record.node.to_string(),
        fqdn: record.fqdn.clone(),
        status,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    environment: &Environment,
    args: NodesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NodesCommand::Enable { nodes, partition } => {
            let mut conn = environment.find_active_device().await?;
            let records = conn.nodes().enable(&nodes, partition.as_deref()).await?;
            print_records(&records, global);
            Ok(())
        }

        NodesCommand::Disable { nodes, partition } => {
            if !util::confirm(
                &format!("Disable {} node(s)? Sessions will drain.", nodes.len()),
                global.yes,
            )? {
                return Ok(());
            }
            let mut conn = environment.find_active_device().await?;
            let records = conn.nodes().disable(&nodes, partition.as_deref()).await?;
            print_records(&records, global);
            Ok(())
        }

        NodesCommand::Status { nodes, partition } => {
            let mut conn = environment.find_active_device().await?;
            let records = conn.nodes().status(&nodes, partition.as_deref()).await?;
            print_records(&records, global);
            Ok(())
        }
    }
}

fn print_records(records: &[NodeStatusRecord], global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        records,
        |r| to_row(r, color),
        |r| r.node.to_string(),
    );
    output::print_output(&out, global.quiet);
}
