// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! SQL DDL for initializing the database schema.
//!
//! Statements are split on `;` when applied, so comments must not contain one.

/// SQLite schema:
/// - `patches` (one row per uploaded patch, unique name)
/// - `patch_reports` (one row per apply/restore attempt, cascades with its patch)
/// - `files` (stored file records, blob bytes live in the file store)
pub const SQLITE_INIT: &str = r"
-- ---------------------------------------------------------------------------
-- Patches
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS patches (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL,
    attachments INTEGER NULL, -- files.id
    status INTEGER NOT NULL DEFAULT 0, -- 0 clean, 1 applied, 2 restored
    timecreated INTEGER NOT NULL,
    timemodified INTEGER NOT NULL,
    timeapplied INTEGER NULL,
    timerestored INTEGER NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_patches_name ON patches(name);

-- ---------------------------------------------------------------------------
-- Reports
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS patch_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    patchid INTEGER NOT NULL REFERENCES patches(id) ON DELETE CASCADE,
    statuscode INTEGER NOT NULL,
    status INTEGER NOT NULL, -- 1 success, 0 error
    operation TEXT NOT NULL, -- apply | restore
    data TEXT NOT NULL,
    timecreated INTEGER NOT NULL,
    timemodified INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patch_reports_patchid ON patch_reports(patchid);

-- ---------------------------------------------------------------------------
-- Stored files (one per component, area and item)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    component TEXT NOT NULL,
    filearea TEXT NOT NULL,
    itemid INTEGER NOT NULL,
    filename TEXT NOT NULL,
    contenthash TEXT NOT NULL, -- sha256 hex
    filesize INTEGER NOT NULL,
    mimetype TEXT NOT NULL,
    timecreated INTEGER NOT NULL,
    UNIQUE(component, filearea, itemid)
);

CREATE INDEX IF NOT EXISTS idx_files_contenthash ON files(contenthash);
";
