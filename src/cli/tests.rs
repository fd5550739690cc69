// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::patch::PatchSubcommand;
use crate::cli::report::ReportSubcommand;
use crate::cli::{Cli, Command};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["codepatcher", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
    assert!(cli.global.configs.is_empty());
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "codepatcher",
        "-l",
        "5",
        "-c",
        "a.toml",
        "--config",
        "b.toml",
        "--git",
        "/usr/bin/git",
        "-s",
        "patcher.timeout_secs=60",
        "options",
    ])
    .unwrap();
    assert_eq!(
        cli.global.configs,
        vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]
    );
    insta::assert_snapshot!(cli.global.to_config_overrides().join("\n"), @r"
    patcher.timeout_secs=60
    global.output_log_level=5
    global.file_log_level=5
    patcher.git=/usr/bin/git
    ");
}

#[test]
fn test_parse_log_level_out_of_range() {
    assert!(Cli::try_parse_from(["codepatcher", "-l", "7", "options"]).is_err());
}

#[test]
fn test_parse_patch_add() {
    let cli = Cli::try_parse_from([
        "codepatcher",
        "patch",
        "add",
        "-n",
        "fix-xss",
        "-f",
        "fix.diff",
    ])
    .unwrap();
    let Some(Command::Patch(args)) = cli.command else {
        panic!("expected patch command");
    };
    let PatchSubcommand::Add(add) = args.subcommand else {
        panic!("expected add");
    };
    assert_eq!(add.name, "fix-xss");
    assert_eq!(add.file, PathBuf::from("fix.diff"));
}

#[test]
fn test_parse_patch_edit_file_is_optional() {
    let cli = Cli::try_parse_from(["codepatcher", "patch", "edit", "3", "--name", "renamed"])
        .unwrap();
    let Some(Command::Patch(args)) = cli.command else {
        panic!("expected patch command");
    };
    let PatchSubcommand::Edit(edit) = args.subcommand else {
        panic!("expected edit");
    };
    assert_eq!(edit.id, 3);
    assert!(edit.file.is_none());

    assert!(Cli::try_parse_from(["codepatcher", "patch", "edit", "3"]).is_err());
}

#[test]
fn test_parse_patch_check_restore() {
    let cli = Cli::try_parse_from(["codepatcher", "patch", "check", "7", "-R"]).unwrap();
    let Some(Command::Patch(args)) = cli.command else {
        panic!("expected patch command");
    };
    assert!(matches!(
        args.subcommand,
        PatchSubcommand::Check(ref check) if check.id == 7 && check.restore
    ));
}

#[test]
fn test_parse_list_request_sources_conflict() {
    let cli = Cli::try_parse_from(["codepatcher", "patch", "list", "-r", r#"{"draw": 2}"#])
        .unwrap();
    let Some(Command::Patch(args)) = cli.command else {
        panic!("expected patch command");
    };
    assert!(matches!(
        args.subcommand,
        PatchSubcommand::List(ref table) if table.request.as_deref() == Some(r#"{"draw": 2}"#)
    ));

    assert!(
        Cli::try_parse_from([
            "codepatcher",
            "patch",
            "list",
            "-r",
            "{}",
            "--request-file",
            "req.json",
        ])
        .is_err()
    );
}

#[test]
fn test_parse_report_list_requires_patch() {
    let cli = Cli::try_parse_from(["codepatcher", "report", "list", "-p", "4"]).unwrap();
    let Some(Command::Report(args)) = cli.command else {
        panic!("expected report command");
    };
    let ReportSubcommand::List(list) = args.subcommand else {
        panic!("expected list");
    };
    assert_eq!(list.patch, 4);
    assert!(list.table.request.is_none());

    assert!(Cli::try_parse_from(["codepatcher", "report", "list"]).is_err());
}

#[test]
fn test_parse_rejects_non_numeric_id() {
    assert!(Cli::try_parse_from(["codepatcher", "patch", "apply", "abc"]).is_err());
}
