//! Validation Pipeline
//!
//! Runs every validator registered for a command type and aggregates all
//! failures before any side effect happens. A command type with no
//! validators passes trivially.

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::warn;

use super::ValidationFailure;
use crate::shared::error::{joined_failures, PlatformError, Result};

/// A read-only check against a request payload.
///
/// Returning `Ok(failures)` reports zero or more field-level problems.
/// Returning `Err` signals an internal fault inside the validator itself
/// (e.g. a lookup it depends on broke); that is surfaced as-is, never
/// folded into the failure list.
#[async_trait]
pub trait Validator<T: Send + Sync>: Send + Sync {
    async fn check(&self, request: &T) -> Result<Vec<ValidationFailure>>;
}

/// Ordered set of validators for one command type.
pub struct ValidationPipeline<T> {
    validators: Vec<Box<dyn Validator<T>>>,
}

impl<T: Send + Sync> ValidationPipeline<T> {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Register a validator. Registration order is preserved in the
    /// aggregated failure sequence.
    pub fn with<V: Validator<T> + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Validate the request, passing it through unchanged on success.
    ///
    /// All validators run concurrently (they are independent, read-only
    /// checks). Failures from every validator are aggregated in
    /// validator-registration order, then per-validator order. A non-empty
    /// aggregate becomes `PlatformError::Validation` carrying the full
    /// sequence; the caller must not proceed to side effects.
    pub async fn run(&self, request: T) -> Result<T> {
        if self.validators.is_empty() {
            return Ok(request);
        }

        let checks = self.validators.iter().map(|v| v.check(&request));
        let results = try_join_all(checks).await?;

        let failures: Vec<ValidationFailure> = results.into_iter().flatten().collect();
        if failures.is_empty() {
            return Ok(request);
        }

        warn!(
            request_type = std::any::type_name::<T>(),
            failures = %joined_failures(&failures),
            "Request validation failed"
        );
        Err(PlatformError::validation(failures))
    }
}

impl<T: Send + Sync> Default for ValidationPipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
