// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Server-side processed tables: paging, sorting and filtering driven by a
//! table client request, against an allow-listed column set.

pub mod columns;
pub mod dates;
pub mod request;
pub mod ssp;


pub use columns::{BindValue, ColumnDef, ColumnType, TableSource};
pub use request::{ColumnRequest, OrderRequest, SearchValue, TableRequest};
pub use ssp::{Direction, SspQuery, TableResult};
