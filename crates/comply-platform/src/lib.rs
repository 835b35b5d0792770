//! Comply Platform
//!
//! Administration backend for compliance frameworks: frameworks and their
//! versioned clause catalogs, the organizations assessed against them, and
//! the identity data that gates who may change what.
//!
//! Every business mutation runs through the same triad:
//! authorization (permission claims on the [`shared::principal::Principal`]),
//! validation (a [`validation::ValidationPipeline`] over the command), and a
//! transactional [`usecase::UnitOfWork`] that stages entity writes together
//! with their audit records and commits or rolls back as one unit.

pub mod answer;
pub mod audit;
pub mod framework;
pub mod identity;
pub mod organization;
pub mod shared;
pub mod store;
pub mod usecase;
pub mod validation;

pub use shared::error::{PlatformError, Result};
pub use shared::principal::{Claim, Principal};
pub use usecase::{Entity, Repo, TxState, UnitOfWork};
