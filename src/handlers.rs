pub mod authz;
pub mod organizations;
pub mod projects;
