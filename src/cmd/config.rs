// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Config-related commands for codepatcher.

use crate::api::{self, Principal, Response};
use crate::config::Config;
use crate::error::Result;

/// Resolved configuration options, gated by the `config` capability.
///
/// # Errors
///
/// Returns an error if `[access]` names an unknown capability.
pub fn run_options_command(config: &Config) -> Result<Response> {
    let principal = Principal::from_config(&config.access)?;
    Ok(Response::wrapped(api::get_options(config, &principal)))
}

/// Display loaded configuration files.
pub fn run_configs_command(config_files: &[String]) {
    if config_files.is_empty() {
        println!("No configuration files loaded");
    } else {
        for line in config_files {
            println!("{line}");
        }
    }
}
