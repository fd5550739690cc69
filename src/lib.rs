// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |                     |
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |            api            |
//!              |  capability check, JSON   |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!              engine      manager   tables
//!           apply/restore   CRUD    datatable
//!             git, locks      |     + render
//!                 |           |        |
//!                 +-----+-----+--------+
//!                       v
//!              store (sqlx)   files (blobs)
//!
//!   +-----------------------------------------+
//!   |  core      process, clock               |
//!   +-----------------------------------------+
//!   |  foundation   config, error, logging    |
//!   +-----------------------------------------+
//! ```

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod context;
pub mod core;
pub mod datatable;
pub mod engine;
pub mod error;
pub mod files;
pub mod git;
pub mod logging;
pub mod manager;
pub mod render;
pub mod store;
pub mod tables;
