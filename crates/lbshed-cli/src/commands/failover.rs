//! Failover command handlers.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use lbshed_core::Environment;

use crate::cli::{FailoverArgs, FailoverCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct FailoverEntry {
    host: String,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Tabled)]
struct FailoverRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "State")]
    state: String,
}

fn to_row(entry: &FailoverEntry, color: bool) -> FailoverRow {
    let state = match (&entry.state, &entry.error) {
        (Some(state), _) if color && state == "active" => state.green().to_string(),
        (Some(state), _) => state.clone(),
        (None, Some(error)) if color => format!("unreachable: {error}").red().to_string(),
        (None, Some(error)) => format!("unreachable: {error}"),
        (None, None) => String::new(),
    };

    FailoverRow {
        host: entry.host.clone(),
        state,
    }
}

#[derive(Serialize)]
struct ActiveDevice {
    host: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    environment: &Environment,
    args: FailoverArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FailoverCommand::Status => {
            let entries: Vec<FailoverEntry> = environment
                .failover_report()
                .await
                .into_iter()
                .map(|probe| FailoverEntry {
                    host: probe.host,
                    state: probe.outcome.as_ref().ok().map(ToString::to_string),
                    error: probe.outcome.err().map(|e| e.to_string()),
                })
                .collect();

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &entries,
                |e| to_row(e, color),
                |e| e.host.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FailoverCommand::Active => {
            let conn = environment.find_active_device().await?;
            let active = ActiveDevice {
                host: conn.host().to_owned(),
            };
            let out = output::render_single(
                &global.output,
                &active,
                |a| a.host.clone(),
                |a| a.host.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
