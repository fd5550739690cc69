// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{EngineSettings, OperationEngine, PatchLocks};
use crate::core::clock::ManualClock;
use crate::error::{ConfigError, NotFoundError, PatcherError, ValidationError};
use crate::files::{FileArea, FileStore};
use crate::store::{Database, Operation, PatchStatus, ReportStatus};

const T0: i64 = 1_700_000_000;

const PATCH: &str = "\
--- a/hello.txt
+++ b/hello.txt
@@ -1 +1 @@
-hello
+hello world
";

struct Fixture {
    dir: tempfile::TempDir,
    db: Database,
    files: FileStore,
    area: FileArea,
    clock: Arc<ManualClock>,
}

impl Fixture {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("hello.txt"), "hello\n").unwrap();

        let db = Database::open_path(&dir.path().join("patches.db")).await.unwrap();
        let files = FileStore::new(dir.path().join("filedir"), db.clone());
        Self {
            dir,
            db,
            files,
            area: FileArea::new("local_codepatcher", "local_codepatcher_patches"),
            clock: Arc::new(ManualClock::new(T0)),
        }
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("app")
    }

    fn settings(&self) -> EngineSettings {
        EngineSettings {
            git: Some(PathBuf::from("git")),
            root: self.root(),
            timeout: Duration::from_secs(30),
            gate_status_on_success: false,
            allow_repeat: true,
        }
    }

    fn engine(&self, settings: EngineSettings) -> OperationEngine {
        OperationEngine::new(
            self.db.clone(),
            self.files.clone(),
            self.area.clone(),
            self.clock.clone(),
            settings,
            PatchLocks::new(),
        )
    }

    async fn upload(&self, name: &str, content: &str) -> i64 {
        let id = self.db.insert_patch(name, T0).await.unwrap();
        let file = self
            .files
            .store(&self.area, id, "fix.diff", content.as_bytes().to_vec(), T0)
            .await
            .unwrap();
        self.db.set_patch_attachment(id, Some(file.id)).await.unwrap();
        id
    }

    fn hello(&self) -> String {
        std::fs::read_to_string(self.root().join("hello.txt")).unwrap()
    }
}

#[tokio::test]
async fn test_apply_then_restore() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;
    let engine = fx.engine(fx.settings());

    fx.clock.advance(10);
    let applied = engine.perform_operation(id, "apply").await.unwrap();
    assert_eq!(applied.patch.status, PatchStatus::Applied);
    assert_eq!(applied.patch.timeapplied, Some(T0 + 10));
    assert_eq!(applied.patch.timemodified, T0);
    assert_eq!(applied.report.statuscode, 0);
    assert_eq!(applied.report.status, ReportStatus::Success);
    assert_eq!(applied.report.operation, Operation::Apply);
    assert_eq!(applied.report.timecreated, T0 + 10);
    assert_eq!(fx.hello(), "hello world\n");

    fx.clock.advance(10);
    let restored = engine.perform_operation(id, "restore").await.unwrap();
    assert_eq!(restored.patch.status, PatchStatus::Restored);
    assert_eq!(restored.patch.timerestored, Some(T0 + 20));
    assert_eq!(restored.patch.timeapplied, Some(T0 + 10));
    assert_eq!(fx.hello(), "hello\n");

    assert_eq!(fx.db.count_reports(id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_apply_twice_records_both_attempts() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;
    let engine = fx.engine(fx.settings());

    let first = engine.perform(id, Operation::Apply).await.unwrap();
    fx.clock.advance(60);
    let second = engine.perform(id, Operation::Apply).await.unwrap();

    assert_eq!(first.report.status, ReportStatus::Success);
    assert_ne!(second.report.statuscode, 0);
    assert_eq!(second.report.status, ReportStatus::Error);
    assert!(!second.report.data.is_empty());

    // The status flips even though git refused the second apply.
    assert_eq!(second.patch.status, PatchStatus::Applied);
    assert!(second.patch.timeapplied > first.patch.timeapplied);
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_gated_status_only_moves_on_success() {
    let fx = Fixture::new().await;
    let id = fx.upload("broken", "--- a/missing.txt\n+++ b/missing.txt\n@@ -1 +1 @@\n-a\n+b\n").await;
    let engine = fx.engine(EngineSettings {
        gate_status_on_success: true,
        ..fx.settings()
    });

    let outcome = engine.perform(id, Operation::Apply).await.unwrap();
    assert_eq!(outcome.report.status, ReportStatus::Error);
    assert_eq!(outcome.patch.status, PatchStatus::Clean);
    assert!(outcome.patch.timeapplied.is_none());

    let stored = fx.db.get_patch(id).await.unwrap().unwrap();
    assert_eq!(stored.status, PatchStatus::Clean);
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_repeat_rejected_when_disabled() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;
    let engine = fx.engine(EngineSettings {
        allow_repeat: false,
        ..fx.settings()
    });

    engine.perform(id, Operation::Apply).await.unwrap();
    let err = engine.perform(id, Operation::Apply).await.unwrap_err();
    assert!(matches!(
        err,
        PatcherError::Validation(ref v) if matches!(**v, ValidationError::RepeatedOperation { .. })
    ));
    assert_eq!(err.status_code(), 400);
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 1);

    // The other direction is still allowed.
    engine.perform(id, Operation::Restore).await.unwrap();
}

#[tokio::test]
async fn test_invalid_actions() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;
    let engine = fx.engine(fx.settings());

    let err = engine.perform_operation(id, "").await.unwrap_err();
    assert_eq!(err.error_code(), "operationnotfound");

    let err = engine.perform_operation(id, "explode").await.unwrap_err();
    assert_eq!(err.error_code(), "invalidoperation");
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_git_fails_before_running() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;

    for git in [None, Some(PathBuf::from("/nonexistent/git"))] {
        let engine = fx.engine(EngineSettings {
            git,
            ..fx.settings()
        });
        let err = engine.perform(id, Operation::Apply).await.unwrap_err();
        assert!(matches!(
            err,
            PatcherError::Config(ref c) if matches!(**c, ConfigError::GitPathNotFound { .. })
        ));
    }
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 0);
    assert_eq!(fx.hello(), "hello\n");
}

#[tokio::test]
async fn test_missing_root_is_config_error() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;

    let file_root = fx.root().join("hello.txt");
    for root in [fx.dir.path().join("gone"), file_root] {
        let engine = fx.engine(EngineSettings {
            root,
            ..fx.settings()
        });
        let err = engine.perform(id, Operation::Apply).await.unwrap_err();
        assert_eq!((err.status_code(), err.error_code()), (500, "configerror"));
        assert!(matches!(
            err,
            PatcherError::Config(ref c) if matches!(**c, ConfigError::InvalidValue { .. })
        ));
        assert!(engine.check(id, Operation::Apply).await.is_err());
    }
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 0);
    assert_eq!(fx.hello(), "hello\n");
}

#[tokio::test]
async fn test_unknown_patch_is_not_found() {
    let fx = Fixture::new().await;
    let engine = fx.engine(fx.settings());
    let err = engine.perform(999, Operation::Apply).await.unwrap_err();
    assert!(matches!(
        err,
        PatcherError::NotFound(ref n) if matches!(**n, NotFoundError::Patch { id: 999 })
    ));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_blob_removed_out_of_band_is_not_found() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;
    let file = fx.files.get_file(&fx.area, id).await.unwrap().unwrap();
    std::fs::remove_file(fx.files.blob_path(&file.contenthash)).unwrap();

    let engine = fx.engine(fx.settings());
    let err = engine.perform(id, Operation::Apply).await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"not found: the code patch file of 'fix-xss' was not found");
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 0);
    assert_eq!(fx.hello(), "hello\n");
}

#[tokio::test]
async fn test_patch_without_file_is_not_found() {
    let fx = Fixture::new().await;
    let id = fx.db.insert_patch("no-file", T0).await.unwrap();
    let engine = fx.engine(fx.settings());
    let err = engine.perform(id, Operation::Restore).await.unwrap_err();
    assert_eq!(err.error_code(), "patchfilenotfound");
}

#[tokio::test]
async fn test_concurrent_operations_each_leave_a_report() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;
    let engine = fx.engine(fx.settings());

    let (a, b) = tokio::join!(
        engine.perform(id, Operation::Apply),
        engine.perform(id, Operation::Apply)
    );
    let codes = [a.unwrap().report.statuscode, b.unwrap().report.statuscode];
    // Serialized: exactly one of the two applies can succeed.
    assert_eq!(codes.iter().filter(|c| **c == 0).count(), 1);
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_is_recorded_as_failed_report() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new().await;
    let id = fx.upload("slow", PATCH).await;
    let slow = fx.dir.path().join("slow-git");
    std::fs::write(&slow, "#!/bin/sh\nexec sleep 10\n").unwrap();
    std::fs::set_permissions(&slow, std::fs::Permissions::from_mode(0o755)).unwrap();

    let engine = fx.engine(EngineSettings {
        git: Some(slow),
        timeout: Duration::from_secs(1),
        ..fx.settings()
    });
    let outcome = engine.perform(id, Operation::Apply).await.unwrap();
    assert_eq!(outcome.report.statuscode, -1);
    assert_eq!(outcome.report.status, ReportStatus::Error);
    insta::assert_snapshot!(outcome.report.data, @"operation timed out after 1 seconds");
}

#[tokio::test]
async fn test_locks_serialize_same_patch_only() {
    let locks = PatchLocks::new();
    let guard = locks.acquire(1).await;

    let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1)).await;
    assert!(blocked.is_err());

    let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire(2)).await;
    assert!(other.is_ok());
    drop(other);

    drop(guard);
    let _again = locks.acquire(1).await;
    assert_eq!(locks.len(), 2);

    locks.forget(2);
    assert_eq!(locks.len(), 1);
}

#[tokio::test]
async fn test_check_leaves_no_trace() {
    let fx = Fixture::new().await;
    let id = fx.upload("fix-xss", PATCH).await;
    let engine = fx.engine(fx.settings());

    let check = engine.check(id, Operation::Apply).await.unwrap();
    assert!(check.applicable);
    assert_eq!(check.exit_code, 0);

    let check = engine.check(id, Operation::Restore).await.unwrap();
    assert!(!check.applicable);
    assert_ne!(check.exit_code, 0);

    assert_eq!(fx.hello(), "hello\n");
    assert_eq!(fx.db.count_reports(id).await.unwrap(), 0);
    let patch = fx.db.get_patch(id).await.unwrap().unwrap();
    assert_eq!(patch.status, PatchStatus::Clean);

    let err = engine.check(id + 1, Operation::Apply).await.unwrap_err();
    assert!(matches!(err, PatcherError::NotFound(_)), "{err:?}");
}
