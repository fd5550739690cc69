// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Version | Configs | Options | Patch | Report
//! ```

use std::process::ExitCode;

use codepatcher::api::Response;
use codepatcher::cli::{self, Command};
use codepatcher::cmd::config::{run_configs_command, run_options_command};
use codepatcher::cmd::patch::run_patch_command;
use codepatcher::cmd::report::run_report_command;
use codepatcher::cmd::{Session, config_loader, load_config};
use codepatcher::config::types::GlobalConfig;
use codepatcher::logging::{LogConfig, LogGuard, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            return ExitCode::SUCCESS;
        }
        Some(Command::Configs) => {
            return match config_loader(&cli.global) {
                Ok(loader) => {
                    run_configs_command(&loader.format_loaded_files());
                    ExitCode::SUCCESS
                }
                Err(e) => report_error(&e),
            };
        }
        Some(command) => dispatch_command(&cli.global, command).await,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(response) => {
            println!("{}", response.to_json_pretty());
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => report_error(&e),
    }
}

async fn dispatch_command(
    global: &cli::global::GlobalOptions,
    command: &Command,
) -> codepatcher::error::Result<Response> {
    let config = load_config(global)?;
    let _log_guard = start_logging(&config.global)?;

    match command {
        Command::Options => run_options_command(&config),
        Command::Patch(args) => {
            let session = Session::open(config).await?;
            let response = run_patch_command(args, &session).await;
            session.close().await;
            response
        }
        Command::Report(args) => {
            let session = Session::open(config).await?;
            let response = run_report_command(args, &session).await;
            session.close().await;
            response
        }
        Command::Version | Command::Configs => {
            anyhow::bail!("command does not open a session")
        }
    }
}

fn start_logging(global: &GlobalConfig) -> codepatcher::error::Result<LogGuard> {
    let log_file = global.log_file.as_os_str();
    let log_config = LogConfig::builder()
        .with_console_level(global.output_log_level)
        .with_file_level(global.file_log_level)
        .maybe_with_log_file((!log_file.is_empty()).then(|| global.log_file.display().to_string()))
        .with_json_file(global.json_log)
        .build();
    init_logging(&log_config)
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn report_error(e: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {e:#}");
    ExitCode::FAILURE
}
