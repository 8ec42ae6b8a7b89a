pub mod membership_service;
pub mod organization_service;
pub mod permissions;
pub mod project_service;
pub mod rbac_service;

pub use membership_service::MembershipManager;
pub use organization_service::OrganizationService;
pub use project_service::ProjectService;
pub use rbac_service::{Authorizer, SimpleAuthorizer};

use crate::common::error::AppError;

/// Checagem de leitura nunca "falha aberta": uma consulta que deu erro vira
/// "sem acesso". NotFound e cancelamento continuam propagados.
pub(crate) fn fail_closed(decision: Result<bool, AppError>) -> Result<bool, AppError> {
    match decision {
        Err(e @ (AppError::NotFound(_) | AppError::Cancelled)) => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "falha ao verificar acesso de leitura; negando");
            Ok(false)
        }
        ok => ok,
    }
}
