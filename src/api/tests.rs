// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::sync::Arc;

use super::{
    Capability, CapabilityChecker, Principal, Response, add_patch, apply_patch, check_patch,
    delete_patch,
    delete_patch_report, edit_patch, get_options, get_patch_info, get_patch_report_info,
    get_patch_reports, get_patches, restore_patch,
};
use crate::config::Config;
use crate::config::types::AccessConfig;
use crate::context::PatcherContext;
use crate::core::clock::ManualClock;
use crate::error::{NotFoundError, PatcherError};
use crate::manager::UploadedFile;
use crate::store::Operation;

const T0: i64 = 1_709_251_200; // 2024-03-01 00:00:00 UTC

const PATCH: &str = "\
--- a/hello.txt
+++ b/hello.txt
@@ -1 +1 @@
-hello
+hello world
";

const ALL_COLUMNS: &str = r#"{
    "draw": 1,
    "columns": [
        {"data": "id", "name": "id"},
        {"data": "name", "name": "name"},
        {"data": "lastaction", "name": "status"},
        {"data": "actions", "name": "", "searchable": false, "orderable": false}
    ],
    "order": [{"column": 0, "dir": "asc"}],
    "start": 0,
    "length": 10,
    "search": {"value": "", "regex": false}
}"#;

async fn context() -> (tempfile::TempDir, Arc<ManualClock>, PatcherContext) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("hello.txt"), "hello\n").unwrap();

    let mut config = Config::default();
    config.storage.database = format!("sqlite://{}", dir.path().join("db/patches.db").display());
    config.storage.files = dir.path().join("filedir");
    config.patcher.git = Some(PathBuf::from("git"));
    config.patcher.root = root;

    let clock = Arc::new(ManualClock::new(T0));
    let ctx = PatcherContext::open_with_clock(&config, clock.clone())
        .await
        .unwrap();
    (dir, clock, ctx)
}

fn diff(content: &str) -> UploadedFile {
    UploadedFile::new("fix.diff", content)
}

fn compact(response: &Response) -> String {
    serde_json::to_string(response).unwrap()
}

#[test]
fn test_capability_names() {
    assert_eq!(Capability::by_name("applypatch"), Some(Capability::APPLYPATCH));
    assert_eq!(Capability::by_name(" ViewReports "), Some(Capability::VIEWREPORTS));
    assert_eq!(Capability::by_name("sudo"), None);
    assert_eq!(Capability::DELETEPATCHREPORT.name(), Some("deletepatchreport"));
    assert_eq!((Capability::VIEWPATCH | Capability::ADDPATCH).name(), None);
}

#[test]
fn test_principal_from_config() {
    let all = Principal::from_config(&AccessConfig::default()).unwrap();
    assert_eq!(all, Principal::all());

    let viewer = Principal::from_config(&AccessConfig {
        capabilities: Some(vec!["viewpatch".into(), "viewreports".into()]),
    })
    .unwrap();
    assert!(viewer.has_capability(Capability::VIEWPATCH));
    assert!(!viewer.has_capability(Capability::APPLYPATCH));

    let err = Principal::from_config(&AccessConfig {
        capabilities: Some(vec!["root".into()]),
    })
    .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'capabilities' in section '[access]': unknown capability 'root'"
    );
}

#[tokio::test]
async fn test_every_endpoint_checks_its_capability() {
    let (_dir, _clock, ctx) = context().await;
    let nobody = Principal::with(Capability::empty());

    let errors: Vec<PatcherError> = vec![
        get_patches(&ctx, &nobody, "{}").await.unwrap_err(),
        get_patch_reports(&ctx, &nobody, 1, "{}").await.unwrap_err(),
        apply_patch(&ctx, &nobody, 1).await.unwrap_err(),
        restore_patch(&ctx, &nobody, 1).await.unwrap_err(),
        check_patch(&ctx, &nobody, 1, Operation::Restore).await.unwrap_err(),
        delete_patch(&ctx, &nobody, 1).await.unwrap_err(),
        delete_patch_report(&ctx, &nobody, 1).await.unwrap_err(),
        get_patch_info(&ctx, &nobody, 1).await.unwrap_err(),
        get_patch_report_info(&ctx, &nobody, 1).await.unwrap_err(),
        add_patch(&ctx, &nobody, "x", diff(PATCH)).await.unwrap_err(),
        edit_patch(&ctx, &nobody, 1, "x", None).await.unwrap_err(),
        get_options(&Config::default(), &nobody).unwrap_err(),
    ];
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    assert!(errors.iter().all(|e| e.status_code() == 403));
    insta::assert_snapshot!(messages.join("\n"), @r"
    permission denied: missing capability 'viewpatch'
    permission denied: missing capability 'viewreports'
    permission denied: missing capability 'applypatch'
    permission denied: missing capability 'restorepatch'
    permission denied: missing capability 'restorepatch'
    permission denied: missing capability 'deletepatch'
    permission denied: missing capability 'deletepatchreport'
    permission denied: missing capability 'viewpatch'
    permission denied: missing capability 'viewreports'
    permission denied: missing capability 'addpatch'
    permission denied: missing capability 'editpatch'
    permission denied: missing capability 'config'
    ");

    let response = Response::wrapped(apply_patch(&ctx, &nobody, 1).await);
    assert_eq!(response.status_code(), 403);
    insta::assert_snapshot!(
        compact(&response),
        @r#"{"error":{"code":403,"errorcode":"nopermissions","message":"permission denied: missing capability 'applypatch'"}}"#
    );
}

#[tokio::test]
async fn test_patch_lifecycle() {
    let (_dir, clock, ctx) = context().await;
    let admin = Principal::all();

    let id = add_patch(&ctx, &admin, "fix-xss", diff(PATCH)).await.unwrap();
    assert_eq!(
        compact(&Response::wrapped(Ok(id))),
        format!(r#"{{"result":{id}}}"#)
    );

    let page = get_patches(&ctx, &admin, ALL_COLUMNS).await.unwrap();
    assert_eq!(page.records_total, 1);
    assert_eq!(page.data[0].lastaction, "None");
    assert_eq!(page.data[0].created, "2024-03-01 00:00:00");

    let info = get_patch_info(&ctx, &admin, id).await.unwrap();
    assert_eq!(info.content, PATCH);

    let check = check_patch(&ctx, &admin, id, Operation::Apply).await.unwrap();
    assert!(check.applicable);

    clock.advance(90);
    let applied = apply_patch(&ctx, &admin, id).await.unwrap();
    insta::assert_snapshot!(
        compact(&Response::wrapped(Ok(applied))),
        @r#"{"result":{"timestamp":"2024-03-01 00:01:30","status":"Applied"}}"#
    );

    clock.advance(30);
    let restored = restore_patch(&ctx, &admin, id).await.unwrap();
    assert_eq!(restored.status, "Restored");
    assert_eq!(restored.timestamp, "2024-03-01 00:02:00");

    let reports = get_patch_reports(&ctx, &admin, id, r#"{"columns": [], "draw": 4}"#)
        .await
        .unwrap();
    assert_eq!(reports.draw, 4);
    assert_eq!(reports.records_total, 2);
    let report_id = reports.data[0].id;

    let report = get_patch_report_info(&ctx, &admin, report_id).await.unwrap();
    assert_eq!(report.date, "2024-03-01 00:01:30");
    assert!(delete_patch_report(&ctx, &admin, report_id).await.unwrap());

    assert!(edit_patch(&ctx, &admin, id, "fix-xss-v2", None).await.unwrap());
    assert_eq!(get_patch_info(&ctx, &admin, id).await.unwrap().name, "fix-xss-v2");

    assert!(delete_patch(&ctx, &admin, id).await.unwrap());
    let err = get_patch_info(&ctx, &admin, id).await.unwrap_err();
    assert!(matches!(
        err,
        PatcherError::NotFound(ref n) if matches!(**n, NotFoundError::Patch { .. })
    ));
    insta::assert_snapshot!(
        compact(&Response::wrapped(Err::<(), _>(err))),
        @r#"{"error":{"code":404,"errorcode":"patchnotfound","message":"not found: code patch 1 was not found"}}"#
    );
}

#[tokio::test]
async fn test_bad_table_requests_are_client_errors() {
    let (_dir, _clock, ctx) = context().await;
    let admin = Principal::all();

    let err = get_patches(&ctx, &admin, "not json").await.unwrap_err();
    assert_eq!((err.status_code(), err.error_code()), (400, "invalidrequest"));

    let unknown = r#"{"columns": [{"name": "password", "search": {"value": "x"}}]}"#;
    let err = get_patches(&ctx, &admin, unknown).await.unwrap_err();
    assert_eq!((err.status_code(), err.error_code()), (400, "unknowncolumn"));

    let response = Response::raw(get_patches(&ctx, &admin, "{}").await);
    assert!(response.is_success());
    insta::assert_snapshot!(
        compact(&response),
        @r#"{"draw":0,"recordsTotal":0,"recordsFiltered":0,"data":[]}"#
    );
}

#[test]
fn test_options_lists_resolved_configuration() {
    let config = Config::default();
    let options = get_options(&config, &Principal::with(Capability::CONFIG)).unwrap();
    assert_eq!(options, config.format_options());
    assert!(options.iter().any(|l| l.starts_with("patcher.timeout_secs")));
}
