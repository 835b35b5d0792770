//! Framework use cases.

pub mod add_clause;
pub mod add_version;
pub mod create;
pub mod delete;
pub mod update;

pub use add_clause::{AddClause, AddClauseCommand};
pub use add_version::{AddVersion, AddVersionCommand};
pub use create::{CreateFramework, CreateFrameworkCommand};
pub use delete::{DeleteFramework, DeleteFrameworkCommand};
pub use update::{UpdateFramework, UpdateFrameworkCommand};
