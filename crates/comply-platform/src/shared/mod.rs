//! Shared platform concerns: errors, principal context, authorization.

pub mod authorization;
pub mod error;
pub mod principal;
