pub mod membership;
pub mod organization;
pub mod project;
pub mod rbac;
