// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Presentation fragments returned by the list endpoints: dates in the
//! configured offset and HTML action markup.
//!
//! Markup goes through an auto-escaping template environment.


use chrono::{DateTime, FixedOffset};
use minijinja::{Environment, context};
use serde::Serialize;
use std::fmt;

/// Rendered date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACTIONS_TEMPLATE_NAME: &str = "actions.html";

const ACTIONS_TEMPLATE: &str = r#"<div class="{{ kind }}-actions-wrapper">
{%- for action in actions -%}
{%- if action.link -%}
<a href="{{ kind }}?id={{ id }}" class="{{ action.name }}-{{ kind }}-action" data-{{ kind }}="{{ id }}" title="{{ action.title }}">{{ action.title }}</a>
{%- else -%}
<button type="button" class="{{ action.name }}-{{ kind }}-action" data-{{ kind }}="{{ id }}" title="{{ action.title }}">{{ action.title }}</button>
{%- endif -%}
{%- endfor -%}
</div>"#;

#[derive(Debug, Clone, Copy, Serialize)]
struct Action {
    name: &'static str,
    title: &'static str,
    link: bool,
}

impl Action {
    const fn button(name: &'static str, title: &'static str) -> Self {
        Self {
            name,
            title,
            link: false,
        }
    }
}

const PATCH_ACTIONS: &[Action] = &[
    Action {
        name: "edit",
        title: "Edit",
        link: true,
    },
    Action::button("view", "View"),
    Action::button("report", "Reports"),
    Action::button("apply", "Apply"),
    Action::button("restore", "Restore"),
    Action::button("delete", "Delete"),
];

const REPORT_ACTIONS: &[Action] = &[
    Action::button("view", "View"),
    Action::button("delete", "Delete"),
];

/// Format a Unix timestamp as `YYYY-MM-DD HH:MM:SS` in `offset`.
///
/// Absent (or out of range) timestamps render as the empty string.
#[must_use]
pub fn format_date(timestamp: Option<i64>, offset: FixedOffset) -> String {
    timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.with_timezone(&offset).format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Renders dates and action markup.
pub struct Renderer {
    env: Environment<'static>,
    offset: FixedOffset,
}

impl Renderer {
    /// # Errors
    ///
    /// Returns an error if the built-in templates fail to compile.
    pub fn new(offset: FixedOffset) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(ACTIONS_TEMPLATE_NAME, ACTIONS_TEMPLATE)?;
        Ok(Self { env, offset })
    }

    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    #[must_use]
    pub fn date(&self, timestamp: Option<i64>) -> String {
        format_date(timestamp, self.offset)
    }

    /// Edit, view, reports, apply, restore and delete controls for a patch.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn patch_actions(&self, id: i64) -> Result<String, minijinja::Error> {
        self.actions("patch", id, PATCH_ACTIONS)
    }

    /// View and delete controls for a report.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn report_actions(&self, id: i64) -> Result<String, minijinja::Error> {
        self.actions("report", id, REPORT_ACTIONS)
    }

    fn actions(
        &self,
        kind: &str,
        id: i64,
        actions: &[Action],
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template(ACTIONS_TEMPLATE_NAME)?
            .render(context! { kind, id, actions })
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
