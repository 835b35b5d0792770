//! Use-case infrastructure: the unit of work and repository handles.

pub mod repository;
pub mod unit_of_work;

pub use repository::{Entity, Repo};
pub use unit_of_work::{TxState, UnitOfWork};
