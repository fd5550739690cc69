// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{ApplyCommand, GitExecutable, check};
use crate::error::ConfigError;
use crate::store::Operation;

const PATCH: &str = "\
--- a/hello.txt
+++ b/hello.txt
@@ -1 +1 @@
-hello
+hello world
";

fn git() -> GitExecutable {
    GitExecutable::resolve(Some(Path::new("git"))).expect("git must be on PATH for these tests")
}

/// A working tree with `hello.txt` and a patch file outside it.
fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("hello.txt"), "hello\n").unwrap();
    let patch = dir.path().join("fix.diff");
    std::fs::write(&patch, PATCH).unwrap();
    (dir, root, patch)
}

#[test]
fn test_resolve_requires_configured_path() {
    assert!(matches!(
        GitExecutable::resolve(None),
        Err(ConfigError::GitPathNotFound { path: None })
    ));
    assert!(matches!(
        GitExecutable::resolve(Some(Path::new(""))),
        Err(ConfigError::GitPathNotFound { path: None })
    ));

    let err = GitExecutable::resolve(Some(Path::new("/nonexistent/bin/git"))).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"git command path was not found: '/nonexistent/bin/git'");

    assert!(GitExecutable::resolve(Some(Path::new("no-such-git-binary-xyz"))).is_err());
}

#[test]
fn test_resolve_bare_name_through_path() {
    let git = git();
    assert!(git.path().is_absolute());
    assert_eq!(
        GitExecutable::resolve(Some(git.path())).unwrap(),
        git
    );
}

#[test]
fn test_apply_arguments() {
    let git = git();
    let apply = ApplyCommand::new(&git, "/srv/app", "/data/ab/cd/abcd", Operation::Apply);
    assert_eq!(apply.args(), ["apply", "/data/ab/cd/abcd"]);

    let restore = ApplyCommand::new(&git, "/srv/app", "/data/ab/cd/abcd", Operation::Restore)
        .check_only();
    assert_eq!(restore.args(), ["apply", "-R", "--check", "/data/ab/cd/abcd"]);
    assert!(restore.command_line().ends_with(" apply -R --check /data/ab/cd/abcd"));
}

#[tokio::test]
async fn test_apply_then_restore() {
    let (_dir, root, patch) = fixture();
    let git = git();

    let applied = ApplyCommand::new(&git, &root, &patch, Operation::Apply)
        .run()
        .await
        .unwrap();
    assert!(applied.success());
    assert_eq!(
        std::fs::read_to_string(root.join("hello.txt")).unwrap(),
        "hello world\n"
    );

    let restored = ApplyCommand::new(&git, &root, &patch, Operation::Restore)
        .run()
        .await
        .unwrap();
    assert!(restored.success());
    assert_eq!(
        std::fs::read_to_string(root.join("hello.txt")).unwrap(),
        "hello\n"
    );
}

#[tokio::test]
async fn test_failed_apply_is_reported_not_raised() {
    let (_dir, root, patch) = fixture();
    std::fs::write(root.join("hello.txt"), "something else\n").unwrap();

    let outcome = ApplyCommand::new(&git(), &root, &patch, Operation::Apply)
        .run()
        .await
        .unwrap();
    assert!(!outcome.success());
    assert_ne!(outcome.exit_code, 0);
    assert!(!outcome.timed_out);
    assert!(outcome.output.contains("hello.txt"), "{}", outcome.output);
}

#[tokio::test]
async fn test_check_does_not_touch_the_tree() {
    let (_dir, root, patch) = fixture();

    let limit = Duration::from_secs(30);
    let outcome = check(&git(), &root, &patch, Operation::Apply, limit).await.unwrap();
    assert!(outcome.success());
    assert_eq!(std::fs::read_to_string(root.join("hello.txt")).unwrap(), "hello\n");

    let outcome = check(&git(), &root, &patch, Operation::Restore, limit).await.unwrap();
    assert!(!outcome.success());
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_is_recorded_in_output() {
    use std::os::unix::fs::PermissionsExt;

    let (dir, root, patch) = fixture();
    let slow = dir.path().join("slow-git");
    std::fs::write(&slow, "#!/bin/sh\necho starting\nexec sleep 10\n").unwrap();
    std::fs::set_permissions(&slow, std::fs::Permissions::from_mode(0o755)).unwrap();

    let git = GitExecutable::resolve(Some(&slow)).unwrap();
    let outcome = ApplyCommand::new(&git, &root, &patch, Operation::Apply)
        .timeout(Duration::from_secs(1))
        .run()
        .await
        .unwrap();

    assert!(outcome.timed_out);
    assert_eq!(outcome.exit_code, -1);
    insta::assert_snapshot!(outcome.output, @r"
    starting
    operation timed out after 1 seconds
    ");
}
