//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use lbshed_config::{EnvironmentProfile, config_path, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let path = config_path();
            eprintln!("lbshed -- configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let name: String = Input::new()
                .with_prompt("Environment name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let hosts: String = Input::new()
                .with_prompt("Device hosts (comma-separated, failover order)")
                .interact_text()
                .map_err(prompt_err)?;

            let username: String = Input::new()
                .with_prompt("Management username")
                .default("admin".into())
                .interact_text()
                .map_err(prompt_err)?;

            let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if username.is_empty() || password.is_empty() {
                return Err(CliError::Validation {
                    field: "credentials".into(),
                    reason: "username and password cannot be empty".into(),
                });
            }

            let store_choices = &[
                "Store password in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the password?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let password_field = if store_selection == 0 {
                lbshed_config::store_password(&name, &username, &password)?;
                eprintln!("   Password stored in system keyring");
                None
            } else {
                Some(password)
            };

            let profile = EnvironmentProfile {
                hosts: hosts
                    .split(',')
                    .map(|h| h.trim().to_owned())
                    .filter(|h| !h.is_empty())
                    .collect(),
                username,
                password: password_field,
                password_env: None,
                route_domain_suffix: None,
                ca_cert: None,
                insecure: None,
                timeout: None,
                extra: HashMap::new(),
            };

            // Merge into any existing config rather than clobbering it.
            let mut cfg = lbshed_config::load_config_or_default();
            cfg.environments.insert(name.clone(), profile);
            if cfg.default_environment.is_none() {
                cfg.default_environment = Some(name.clone());
            }
            save_config(&cfg)?;

            eprintln!("\nEnvironment '{name}' saved to {}", path.display());
            Ok(())
        }

        // ── Show: effective config, secrets redacted ────────────────
        ConfigCommand::Show => {
            let mut cfg = lbshed_config::load_config_or_default();
            for profile in cfg.environments.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some("<redacted>".into());
                }
            }

            let rendered = toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            })?;
            if !global.quiet {
                println!("{rendered}");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config_path().display());
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { environment } => {
            let cfg = lbshed_config::load_config_or_default();
            let name = environment
                .or_else(|| global.environment.clone())
                .or_else(|| cfg.default_environment.clone())
                .ok_or(CliError::NoEnvironment)?;

            let Some(profile) = cfg.environments.get(&name) else {
                let mut available: Vec<_> = cfg.environments.keys().cloned().collect();
                available.sort();
                return Err(CliError::EnvironmentNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            };

            let password = rpassword::prompt_password(format!(
                "Password for {}@{name}: ",
                profile.username
            ))
            .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            lbshed_config::store_password(&name, &profile.username, &password)?;
            eprintln!("Password stored in system keyring for '{name}'");
            Ok(())
        }
    }
}
