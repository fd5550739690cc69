// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core modules for subprocesses and time.
//!
//! ```text
//!        core
//!         |
//!    +----+----+
//!    |         |
//!    v         v
//! process    clock
//!    |         |
//! Builder   Clock trait
//! Output    SystemClock
//! ```

pub mod clock;
pub mod process;
