//! Environment listing.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{EnvironmentsArgs, EnvironmentsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct EnvironmentEntry {
    name: String,
    hosts: Vec<String>,
    username: String,
    default: bool,
}

#[derive(Tabled)]
struct EnvironmentRow {
    #[tabled(rename = "Environment")]
    name: String,
    #[tabled(rename = "Hosts")]
    hosts: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&EnvironmentEntry> for EnvironmentRow {
    fn from(e: &EnvironmentEntry) -> Self {
        Self {
            name: e.name.clone(),
            hosts: e.hosts.join(", "),
            username: e.username.clone(),
            default: if e.default { "*".into() } else { String::new() },
        }
    }
}

pub fn handle(args: EnvironmentsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        EnvironmentsCommand::List => {
            // A missing file is fine (empty listing); a malformed one is not.
            let cfg = lbshed_config::load_config()?;

            let mut entries: Vec<EnvironmentEntry> = cfg
                .environments
                .iter()
                .map(|(name, profile)| EnvironmentEntry {
                    name: name.clone(),
                    hosts: profile.hosts.clone(),
                    username: profile.username.clone(),
                    default: cfg.default_environment.as_deref() == Some(name),
                })
                .collect();
            entries.sort_by(|a, b| a.name.cmp(&b.name));

            let out = output::render_list(
                &global.output,
                &entries,
                |e| EnvironmentRow::from(e),
                |e| e.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
