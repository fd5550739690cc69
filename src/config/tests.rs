// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Config, ConfigLoader};
use crate::logging::LogLevel;
use std::path::PathBuf;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
    assert_eq!(config.patcher.timeout_secs, 300);
    assert!(config.patcher.allow_repeat);
    assert!(!config.patcher.gate_status_on_success);
    assert!(config.patcher.git.is_none());
    assert_eq!(config.storage.component, "local_codepatcher");
    assert_eq!(config.storage.filearea, "local_codepatcher_patches");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_parse() {
    let toml = r#"
[global]
output_log_level = 4

[patcher]
git = "/usr/bin/git"
root = "/var/www/app"
timeout_secs = 30
allow_repeat = false
utc_offset_minutes = 120

[storage]
database = "sqlite://test.db"
"#;
    let config = Config::parse(toml).unwrap();
    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert_eq!(config.patcher.git, Some(PathBuf::from("/usr/bin/git")));
    assert_eq!(config.patcher.root, PathBuf::from("/var/www/app"));
    assert_eq!(config.patcher.timeout_secs, 30);
    assert!(!config.patcher.allow_repeat);
    assert_eq!(
        config.patcher.utc_offset().unwrap().local_minus_utc(),
        7200
    );
    assert_eq!(config.storage.database, "sqlite://test.db");
    // Untouched sections keep their defaults.
    assert_eq!(config.storage.files, PathBuf::from("filedir"));
}

#[test]
fn test_deny_unknown_fields() {
    let toml = r"
[patcher]
gti = '/usr/bin/git'
";
    assert!(Config::parse(toml).is_err());

    let toml = r"
[paths]
prefix = '/build'
";
    assert!(Config::parse(toml).is_err());
}

#[test]
fn test_validate_rejects_unusable_values() {
    let zero_timeout = "[patcher]\ntimeout_secs = 0\n";
    let err = Config::parse(zero_timeout).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'timeout_secs' in section '[patcher]': timeout must be positive"
    );

    let wide_offset = "[patcher]\nutc_offset_minutes = 1440\n";
    assert!(Config::parse(wide_offset).is_err());

    let empty_area = "[storage]\nfilearea = ' '\n";
    assert!(Config::parse(empty_area).is_err());
}

#[test]
fn test_config_loader_set_override() {
    let config = ConfigLoader::new()
        .add_toml_str("[patcher]\ntimeout_secs = 30\n")
        .set("patcher.timeout_secs", "45")
        .set("patcher.gate_status_on_success", "true")
        .set("patcher.git", "git")
        .build()
        .unwrap();
    assert_eq!(config.patcher.timeout_secs, 45);
    assert!(config.patcher.gate_status_on_success);
    assert_eq!(config.patcher.git, Some(PathBuf::from("git")));
}

#[test]
fn test_config_loader_with_env_prefix() {
    // SAFETY: the variable name is unique to this test.
    unsafe {
        std::env::set_var("CPTEST_PATCHER__TIMEOUT_SECS", "12");
        std::env::set_var("CPTEST_STORAGE__FILEAREA", "env_area");
    }

    let config = ConfigLoader::new()
        .add_toml_str("[patcher]\ntimeout_secs = 30\n")
        .with_env_prefix("CPTEST")
        .build();

    // SAFETY: see above.
    unsafe {
        std::env::remove_var("CPTEST_PATCHER__TIMEOUT_SECS");
        std::env::remove_var("CPTEST_STORAGE__FILEAREA");
    }

    let config = config.unwrap();
    assert_eq!(config.patcher.timeout_secs, 12);
    assert_eq!(config.storage.filearea, "env_area");
}

#[test]
fn test_config_loader_layered_sources() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.toml");
    std::fs::write(&base, "[patcher]\nroot = '/srv/base'\ntimeout_secs = 10\n").unwrap();

    let config = ConfigLoader::new()
        .add_toml_file(&base)
        .add_toml_str("[patcher]\ntimeout_secs = 20\n")
        .build()
        .unwrap();
    assert_eq!(config.patcher.root, PathBuf::from("/srv/base"));
    assert_eq!(config.patcher.timeout_secs, 20);
}

#[test]
fn test_config_loader_add_toml_file_not_found() {
    let result = ConfigLoader::new()
        .add_toml_file("/nonexistent/codepatcher.toml")
        .build();
    assert!(result.is_err());
}

#[test]
fn test_config_loader_optional_only_tracks_existing() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("present.toml");
    std::fs::write(&present, "").unwrap();

    let loader = ConfigLoader::new()
        .add_toml_file_optional(dir.path().join("missing.toml"))
        .add_toml_file_optional(&present)
        .add_toml_str("");
    let files = loader.format_loaded_files();
    assert_eq!(files.len(), 2);
    assert!(files[0].starts_with("1. [optional] "));
    assert_eq!(files[1], "2. [string] <string>");
}

#[test]
fn test_format_options_deterministic() {
    let config = Config::parse("[access]\ncapabilities = ['viewpatch', 'viewreports']\n").unwrap();
    let options = config.format_options();
    assert_eq!(options, config.format_options());

    let keys: Vec<&str> = options
        .iter()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);

    assert!(
        options
            .iter()
            .any(|line| line.ends_with("= viewpatch,viewreports"))
    );
    assert!(options.iter().any(|line| line.starts_with("patcher.git ")));
}
