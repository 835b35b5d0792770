//! Organization use cases.

pub mod add_department;
pub mod add_member;
pub mod create;

pub use add_department::{AddDepartment, AddDepartmentCommand};
pub use add_member::{AddMember, AddMemberCommand};
pub use create::{CreateOrganization, CreateOrganizationCommand};
