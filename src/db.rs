pub mod store;
pub use store::{MembershipStore, OrganizationStore, ProjectStore};
pub mod memory;
pub use memory::MemoryStore;
pub mod membership_repo;
pub use membership_repo::MembershipRepository;
pub mod organization_repo;
pub use organization_repo::OrganizationRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
