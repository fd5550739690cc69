// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! GlobalOptions --> config_loader() --> Config
//!                                         |
//!                                   Session::open()
//!                          PatcherContext + Principal
//!                                         |
//!          run_patch_command / run_report_command / run_options_command
//!                                         |
//!                                   api endpoint --> Response (JSON on stdout)
//! ```

pub mod config;
pub mod patch;
pub mod report;


use anyhow::{Context, anyhow};
use std::path::Path;

use crate::api::Principal;
use crate::cli::global::GlobalOptions;
use crate::cli::patch::TableArgs;
use crate::config::loader::ConfigLoader;
use crate::config::{Config, ENV_PREFIX, LOCAL_CONFIG_FILE};
use crate::context::PatcherContext;
use crate::error::Result;
use crate::manager::UploadedFile;

/// Request used when neither `--request` nor `--request-file` is given.
const DEFAULT_TABLE_REQUEST: &str = "{}";

/// Builds the layered loader for the global options.
///
/// # Errors
///
/// Returns an error if a `--set` option is not `KEY=VALUE`.
pub fn config_loader(global: &GlobalOptions) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(LOCAL_CONFIG_FILE);
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);

    for option in global.to_config_overrides() {
        let (key, value) = option
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid option '{option}', expected KEY=VALUE"))?;
        loader = loader.set(key.trim(), value.trim());
    }
    Ok(loader)
}

/// Loads and validates the configuration for the global options.
///
/// # Errors
///
/// Returns an error if a source is missing or invalid.
pub fn load_config(global: &GlobalOptions) -> Result<Config> {
    config_loader(global)?
        .build()
        .context("failed to load configuration")
}

/// An open context and the principal acting on it.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub ctx: PatcherContext,
    pub principal: Principal,
}

impl Session {
    /// # Errors
    ///
    /// Returns an error if `[access]` names an unknown capability or the
    /// database cannot be opened.
    pub async fn open(config: Config) -> Result<Self> {
        let principal = Principal::from_config(&config.access)?;
        let ctx = PatcherContext::open(&config)
            .await
            .context("failed to open patch storage")?;
        Ok(Self {
            config,
            ctx,
            principal,
        })
    }

    pub async fn close(self) {
        self.ctx.close().await;
    }
}

/// The datatable request JSON selected by `args`.
async fn table_request(args: &TableArgs) -> Result<String> {
    match (&args.request, &args.request_file) {
        (Some(json), _) => Ok(json.clone()),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read request file {}", path.display())),
        (None, None) => Ok(DEFAULT_TABLE_REQUEST.to_string()),
    }
}

/// Reads a diff from disk as an upload named after the file.
async fn read_upload(path: &Path) -> Result<UploadedFile> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read patch file {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadedFile::new(filename, content))
}
