// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for codepatcher.
//!
//! ```text
//! Config: GlobalConfig, PatcherConfig, StorageConfig, AccessConfig
//! ```

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Default timeout for a single `git apply` invocation.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file.
    pub log_file: PathBuf,
    /// Write the log file as JSON lines.
    pub json_log: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: PathBuf::from("codepatcher.log"),
            json_log: false,
        }
    }
}

/// Patch operation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatcherConfig {
    /// Path to the git executable. Absolute path, or a bare name looked up in `PATH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<PathBuf>,
    /// Working tree that patches are applied to.
    pub root: PathBuf,
    /// Upper bound for one `git apply` run.
    pub timeout_secs: u64,
    /// Only flip the patch status when git exits successfully.
    pub gate_status_on_success: bool,
    /// Allow applying an applied patch (or restoring a restored one) again.
    pub allow_repeat: bool,
    /// Offset from UTC used for date rendering and date searches.
    pub utc_offset_minutes: i32,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            git: None,
            root: PathBuf::from("."),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            gate_status_on_success: false,
            allow_repeat: true,
            utc_offset_minutes: 0,
        }
    }
}

impl PatcherConfig {
    /// Resolve the configured offset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the offset is a full day or more.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::InvalidValue {
                section: "patcher".to_string(),
                key: "utc_offset_minutes".to_string(),
                message: format!(
                    "offset must be within +/-1439 minutes, got {}",
                    self.utc_offset_minutes
                ),
            })
    }
}

/// Database and file store locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite connection URL.
    pub database: String,
    /// Root directory of the content-addressed file store.
    pub files: PathBuf,
    /// Component owning stored patch files.
    pub component: String,
    /// File area holding stored patch files.
    pub filearea: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: "sqlite://codepatcher.db".to_string(),
            files: PathBuf::from("filedir"),
            component: "local_codepatcher".to_string(),
            filearea: "local_codepatcher_patches".to_string(),
        }
    }
}

/// Capabilities granted to the local principal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Granted capability names. `None` grants every capability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
}
