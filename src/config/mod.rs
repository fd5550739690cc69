// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for codepatcher.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. local codepatcher.toml (cwd)
//! 3. --config
//! 4. CODEPATCHER_* env vars
//! 5. CLI overrides (--set)
//! ```
//!
//! # Environment Variable Mapping
//!
//! Sections and keys are separated by a double underscore, so keys that
//! contain underscores survive the mapping:
//!
//! ```text
//! CODEPATCHER_PATCHER__GIT=/usr/bin/git      → patcher.git
//! CODEPATCHER_PATCHER__TIMEOUT_SECS=60       → patcher.timeout_secs
//! CODEPATCHER_STORAGE__DATABASE=sqlite://x   → storage.database
//! ```

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{AccessConfig, GlobalConfig, PatcherConfig, StorageConfig};

/// Name of the configuration file picked up from the working directory.
pub const LOCAL_CONFIG_FILE: &str = "codepatcher.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CODEPATCHER";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Patch operation settings.
    pub patcher: PatcherConfig,
    /// Database and file store.
    pub storage: StorageConfig,
    /// Capabilities of the local principal.
    pub access: AccessConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use codepatcher::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("codepatcher.toml")
    ///     .with_env_prefix("CODEPATCHER")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Check values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero timeout, an offset of a
    /// day or more, or an empty storage component/area.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.patcher.timeout_secs == 0 {
            return Err(invalid("patcher", "timeout_secs", "timeout must be positive"));
        }
        self.patcher.utc_offset()?;
        if self.storage.component.trim().is_empty() {
            return Err(invalid("storage", "component", "component must not be empty"));
        }
        if self.storage.filearea.trim().is_empty() {
            return Err(invalid("storage", "filearea", "file area must not be empty"));
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_patcher_options(&mut options);
        self.format_storage_options(&mut options);
        self.format_access_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global.log_file.display().to_string(),
        );
        options.insert("global.json_log".into(), self.global.json_log.to_string());
    }

    fn format_patcher_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "patcher.git".into(),
            self.patcher
                .git
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert(
            "patcher.root".into(),
            self.patcher.root.display().to_string(),
        );
        options.insert(
            "patcher.timeout_secs".into(),
            self.patcher.timeout_secs.to_string(),
        );
        options.insert(
            "patcher.gate_status_on_success".into(),
            self.patcher.gate_status_on_success.to_string(),
        );
        options.insert(
            "patcher.allow_repeat".into(),
            self.patcher.allow_repeat.to_string(),
        );
        options.insert(
            "patcher.utc_offset_minutes".into(),
            self.patcher.utc_offset_minutes.to_string(),
        );
    }

    fn format_storage_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("storage.database".into(), self.storage.database.clone());
        options.insert(
            "storage.files".into(),
            self.storage.files.display().to_string(),
        );
        options.insert("storage.component".into(), self.storage.component.clone());
        options.insert("storage.filearea".into(), self.storage.filearea.clone());
    }

    fn format_access_options(&self, options: &mut BTreeMap<String, String>) {
        let granted = self
            .access
            .capabilities
            .as_ref()
            .map_or_else(|| "[all]".to_string(), |caps| caps.join(","));
        options.insert("access.capabilities".into(), granted);
    }
}

fn invalid(section: &str, key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.to_string(),
    }
}
