// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::FixedOffset;

use super::{patches_page, reports_page};
use crate::datatable::{ColumnRequest, OrderRequest, SearchValue, TableRequest};
use crate::render::Renderer;
use crate::store::{Database, NewReport, Operation};

const DAY: i64 = 1_709_251_200; // 2024-03-01 00:00:00 UTC

fn renderer() -> Renderer {
    Renderer::new(FixedOffset::east_opt(0).unwrap()).unwrap()
}

fn request(names: &[&str]) -> TableRequest {
    TableRequest {
        columns: names.iter().map(|n| ColumnRequest::named(*n)).collect(),
        ..TableRequest::default()
    }
}

async fn seeded() -> (Database, i64, i64) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let xss = db.insert_patch("fix-xss", DAY).await.unwrap();
    let csrf = db.insert_patch("fix-csrf", DAY + 60).await.unwrap();
    for (statuscode, operation, offset) in [
        (0, Operation::Apply, 3600),
        (1, Operation::Restore, 7200),
        (0, Operation::Apply, 86_400),
    ] {
        db.record_operation(
            &NewReport {
                patchid: xss,
                statuscode,
                operation,
                data: String::new(),
                time: DAY + offset,
            },
            true,
        )
        .await
        .unwrap();
    }
    (db, xss, csrf)
}

#[tokio::test]
async fn test_patch_rows_are_rendered() {
    let (db, xss, _) = seeded().await;
    let mut req = request(&["id", "name", "status", "timeapplied"]);
    req.order = vec![OrderRequest {
        column: 1,
        dir: "asc".to_string(),
    }];

    let page = patches_page(db.pool(), &renderer(), &req).await.unwrap();
    assert_eq!(page.records_total, 2);
    assert_eq!(page.data[0].name, "fix-csrf");
    assert_eq!(page.data[0].lastaction, "None");
    assert_eq!(page.data[0].applied, "");

    let row = &page.data[1];
    assert_eq!(row.id, xss);
    assert_eq!(row.lastaction, "Applied");
    assert_eq!(row.applied, "2024-03-02 00:00:00");
    assert_eq!(row.restored, "2024-03-01 02:00:00");
    assert_eq!(row.created, "2024-03-01 00:00:00");
    assert_eq!(row.modified, "2024-03-01 00:00:00");
    assert!(row.actions.contains(&format!("data-patch=\"{xss}\"")));
}

#[tokio::test]
async fn test_patch_search_by_status_and_day() {
    let (db, xss, _) = seeded().await;

    let mut req = request(&["status", "timeapplied"]);
    req.columns[0].search = SearchValue::new("1");
    let page = patches_page(db.pool(), &renderer(), &req).await.unwrap();
    assert_eq!(page.records_filtered, 1);
    assert_eq!(page.data[0].id, xss);

    let mut req = request(&["status", "timeapplied"]);
    req.columns[1].search = SearchValue::new("2024-03-01");
    let page = patches_page(db.pool(), &renderer(), &req).await.unwrap();
    assert_eq!(page.records_filtered, 0);
    assert_eq!(page.records_total, 2);
}

#[tokio::test]
async fn test_reports_are_scoped_to_their_patch() {
    let (db, xss, csrf) = seeded().await;
    let mut req = request(&["timecreated", "status", "operation"]);
    req.order = vec![OrderRequest {
        column: 0,
        dir: "desc".to_string(),
    }];

    let page = reports_page(db.pool(), &renderer(), xss, &req).await.unwrap();
    assert_eq!(page.records_total, 3);
    let rows: Vec<(&str, &str, &str)> = page
        .data
        .iter()
        .map(|r| (r.timecreated.as_str(), r.status, r.operation))
        .collect();
    assert_eq!(
        rows,
        [
            ("2024-03-02 00:00:00", "Successful", "Apply"),
            ("2024-03-01 02:00:00", "Error occurred", "Restore"),
            ("2024-03-01 01:00:00", "Successful", "Apply"),
        ]
    );
    assert!(page.data[0].actions.contains("data-report="));

    req.columns[2].search = SearchValue::new("REST");
    let page = reports_page(db.pool(), &renderer(), xss, &req).await.unwrap();
    assert_eq!((page.records_total, page.records_filtered), (3, 1));

    let page = reports_page(db.pool(), &renderer(), csrf, &req).await.unwrap();
    assert_eq!((page.records_total, page.records_filtered), (0, 0));
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_identical_requests_give_identical_results() {
    let (db, _, _) = seeded().await;
    let mut req = request(&["name", "timecreated"]);
    req.search = SearchValue::new("fix");
    req.length = 1;

    let first = patches_page(db.pool(), &renderer(), &req).await.unwrap();
    let second = patches_page(db.pool(), &renderer(), &req).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert!(first.records_filtered <= first.records_total);
}
