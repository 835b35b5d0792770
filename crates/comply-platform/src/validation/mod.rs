//! Request Validation
//!
//! Field-level validation for inbound commands. Validators are read-only
//! checks against the request payload; the pipeline runs every registered
//! validator, aggregates all failures, and either passes the request
//! through unchanged or fails with the full failure list.

mod pipeline;

pub use pipeline::{ValidationPipeline, Validator};

use serde::{Deserialize, Serialize};

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    /// Path of the offending field, e.g. `name` or `items[2].text`.
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
