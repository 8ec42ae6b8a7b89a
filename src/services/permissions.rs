// src/services/permissions.rs

//! Matriz fixa de permissões por (tipo de recurso, papel, ação).
//! Todos os `match` são exaustivos: uma ação nova obriga a revisar cada célula.

use crate::models::rbac::{Action, ResourceType, Role};

pub fn has_permission(resource_type: ResourceType, role: Role, action: Action) -> bool {
    match resource_type {
        ResourceType::Org => org_permission(role, action),
        ResourceType::Project => project_permission(role, action),
    }
}

pub fn org_permission(role: Role, action: Action) -> bool {
    match (role, action) {
        (Role::Owner, Action::View | Action::Create | Action::Update | Action::Delete | Action::Manage) => true,

        (Role::Admin, Action::View | Action::Create | Action::Update | Action::Manage) => true,
        (Role::Admin, Action::Delete) => false,

        (Role::Member, Action::View) => true,
        (Role::Member, Action::Create | Action::Update | Action::Delete | Action::Manage) => false,
    }
}

/// Projetos não têm owner; um papel `Owner` aqui nunca concede nada.
pub fn project_permission(role: Role, action: Action) -> bool {
    match (role, action) {
        (Role::Owner, Action::View | Action::Create | Action::Update | Action::Delete | Action::Manage) => false,

        (Role::Admin, Action::View | Action::Create | Action::Update | Action::Delete | Action::Manage) => true,

        (Role::Member, Action::View | Action::Create | Action::Update) => true,
        (Role::Member, Action::Delete | Action::Manage) => false,
    }
}

/// Único ponto de tradução de privilégio entre org e projeto.
pub fn map_org_role_to_project_role(org_role: Role) -> Role {
    match org_role {
        Role::Owner | Role::Admin => Role::Admin,
        Role::Member => Role::Member,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [Role; 3] = [Role::Owner, Role::Admin, Role::Member];

    fn allowed(resource_type: ResourceType, role: Role) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| has_permission(resource_type, role, *a))
            .collect()
    }

    #[test]
    fn org_matrix_cells() {
        assert_eq!(allowed(ResourceType::Org, Role::Owner), Action::ALL.to_vec());
        assert_eq!(
            allowed(ResourceType::Org, Role::Admin),
            vec![Action::View, Action::Create, Action::Update, Action::Manage]
        );
        assert_eq!(allowed(ResourceType::Org, Role::Member), vec![Action::View]);
    }

    #[test]
    fn project_matrix_cells() {
        assert!(allowed(ResourceType::Project, Role::Owner).is_empty());
        assert_eq!(
            allowed(ResourceType::Project, Role::Admin),
            Action::ALL.to_vec()
        );
        assert_eq!(
            allowed(ResourceType::Project, Role::Member),
            vec![Action::View, Action::Create, Action::Update]
        );
    }

    #[test]
    fn higher_roles_never_have_fewer_permissions() {
        for resource_type in [ResourceType::Org, ResourceType::Project] {
            for action in Action::ALL {
                if has_permission(resource_type, Role::Member, action) {
                    assert!(has_permission(resource_type, Role::Admin, action));
                }
            }
        }
        for action in Action::ALL {
            if org_permission(Role::Admin, action) {
                assert!(org_permission(Role::Owner, action));
            }
        }
    }

    #[test]
    fn org_roles_downgrade_into_project_roles() {
        assert_eq!(map_org_role_to_project_role(Role::Owner), Role::Admin);
        assert_eq!(map_org_role_to_project_role(Role::Admin), Role::Admin);
        assert_eq!(map_org_role_to_project_role(Role::Member), Role::Member);

        // O papel mapeado nunca é Owner
        for role in ROLES {
            assert_ne!(map_org_role_to_project_role(role), Role::Owner);
        }
    }
}
