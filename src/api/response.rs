// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON shapes at the endpoint boundary.
//!
//! ```text
//! Ok(table)  -> {draw, recordsTotal, recordsFiltered, data}
//! Ok(value)  -> {result: value}
//! Err(e)     -> {error: {code, errorcode, message}}
//! ```

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{PatcherError, PatcherResult};

/// Result of an apply or restore call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    /// Time of the operation in the configured offset, empty if it never ran.
    pub timestamp: String,
    /// Patch status label after the call.
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope<T> {
    pub result: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub errorcode: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl From<&PatcherError> for ErrorResponse {
    fn from(err: &PatcherError) -> Self {
        Self {
            error: ErrorBody {
                code: err.status_code(),
                errorcode: err.error_code().to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// A serialized endpoint response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Success(Value),
    Failure(ErrorResponse),
}

impl Response {
    /// Payload serialized as is (table endpoints).
    pub fn raw<T: Serialize>(result: PatcherResult<T>) -> Self {
        match result {
            Ok(value) => Self::serialize(&value),
            Err(e) => Self::failure(&e),
        }
    }

    /// Payload wrapped as `{result: ...}`.
    pub fn wrapped<T: Serialize>(result: PatcherResult<T>) -> Self {
        Self::raw(result.map(|result| Envelope { result }))
    }

    #[must_use]
    pub fn failure(err: &PatcherError) -> Self {
        if err.is_domain() {
            debug!(code = err.error_code(), error = %err, "request rejected");
        } else {
            error!(code = err.error_code(), error = %err, "request failed");
        }
        Self::Failure(ErrorResponse::from(err))
    }

    fn serialize<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => Self::Success(v),
            Err(e) => Self::failure(&PatcherError::Other(
                format!("failed to serialize response: {e}").into_boxed_str(),
            )),
        }
    }

    /// 200 on success, otherwise the error's status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Success(_) => 200,
            Self::Failure(e) => e.error.code,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Pretty-printed JSON.
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(r#"{{"error":{{"code":500,"errorcode":"generalexception","message":"{e}"}}}}"#)
        })
    }
}
