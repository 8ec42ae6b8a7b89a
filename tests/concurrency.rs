mod common;

use common::{ctx, org_payload, Harness};
use rebac::{
    models::rbac::{ResourceRef, Role},
    AppError,
};
use tokio::task::JoinSet;

const CALLERS: usize = 16;

fn assert_single_winner<T>(results: &[Result<T, AppError>]) {
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::AlreadyExists(_))))
        .count();
    assert_eq!(ok, 1, "exatamente uma chamada deve vencer");
    assert_eq!(conflicts, results.len() - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_org_member_adds_create_one_row() {
    let h = Harness::new();
    let org = h.create_org("alice", "acme").await;

    let mut tasks = JoinSet::new();
    for _ in 0..CALLERS {
        let service = h.state.org_service.clone();
        tasks.spawn(async move {
            service
                .add_org_member(&ctx("alice"), org.id, "bob", Role::Member)
                .await
        });
    }
    let results = tasks.join_all().await;

    assert_single_winner(&results);
    let members = h
        .state
        .membership_manager
        .get_resource_members(&ctx("alice"), ResourceRef::Org(org.id))
        .await
        .unwrap();
    assert_eq!(members.iter().filter(|m| m.user_id == "bob").count(), 1);
    assert_eq!(members.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_manager_adds_on_one_project_tuple() {
    let h = Harness::new();
    let org = h.create_org("alice", "acme").await;
    let project = h.create_project("alice", org.id, "web").await;
    let resource = ResourceRef::Project(project.id);

    let mut tasks = JoinSet::new();
    for i in 0..CALLERS {
        let manager = h.state.membership_manager.clone();
        // Papéis diferentes não contornam a unicidade da tupla.
        let role = if i % 2 == 0 { Role::Member } else { Role::Admin };
        tasks.spawn(async move {
            manager
                .add_member(&ctx("alice"), "carol", resource, role, Some("alice"))
                .await
        });
    }
    let results = tasks.join_all().await;

    assert_single_winner(&results);
    let members = h
        .state
        .membership_manager
        .get_resource_members(&ctx("alice"), resource)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, "carol");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_org_creation_with_one_slug() {
    let h = Harness::new();

    let mut tasks = JoinSet::new();
    for i in 0..CALLERS {
        let service = h.state.org_service.clone();
        tasks.spawn(async move {
            let user = format!("user-{i}");
            let result = service
                .create_org(&ctx(&user), org_payload("Acme", "acme"))
                .await;
            (user, result)
        });
    }
    let outcomes = tasks.join_all().await;

    let (winners, losers): (Vec<_>, Vec<_>) = outcomes.into_iter().partition(|(_, r)| r.is_ok());
    assert_eq!(winners.len(), 1);
    assert!(losers
        .iter()
        .all(|(_, r)| matches!(r, Err(AppError::AlreadyExists(_)))));

    let (winner, created) = &winners[0];
    let org = created.as_ref().unwrap();
    let owner = h
        .state
        .membership_manager
        .org_owner(&ctx(winner), org.id)
        .await
        .unwrap()
        .map(|m| m.user_id);
    assert_eq!(owner.as_deref(), Some(winner.as_str()));

    // Nenhum perdedor ficou com organização ou relação pendurada.
    for (loser, _) in &losers {
        let memberships = h
            .state
            .membership_manager
            .get_user_memberships(&ctx(loser), loser)
            .await
            .unwrap();
        assert!(memberships.is_empty(), "{loser} ficou com uma relação");
    }
}
