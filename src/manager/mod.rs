// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Create, edit, inspect and delete patches and their reports.
//!
//! ```text
//! PatchManager                       ReportManager
//!   create_patch  -> patches + file    get_report_info -> {date, content}
//!   update_patch  -> rename / refile   delete_report   -> bool
//!   get_patch_info -> {name, content}
//!   delete_patch  -> rows + reports + file
//! ```

mod patches;
mod reports;


pub use patches::{NewPatch, PatchInfo, PatchManager, PatchUpdate, UploadedFile};
pub use reports::{ReportInfo, ReportManager};
