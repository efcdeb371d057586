//! End-to-end scenarios driving the facade across every component: the
//! admin API mutates the graph, the evaluator answers authorization
//! questions, and the rate limiter accounts requests independently per
//! tenant. Mirrors the teacher workspace's cross-crate contract-test
//! style (`riptide-types/tests/*_contract_tests.rs`).

use acs::AccessControlSystem;
use acs_types::ids::TenantId;

async fn system() -> AccessControlSystem {
    AccessControlSystem::builder().build().await.unwrap()
}

#[tokio::test]
async fn deny_wins_over_a_separately_granted_role() {
    let system = system().await;
    let tenant = TenantId::new("acme");
    let admin = system.admin();

    let user = admin.create_user(&tenant, "root", "user@example.com").await.unwrap();
    let group = admin.create_group(&tenant, "root", "docs-editors").await.unwrap();
    let role = admin.create_role(&tenant, "root", "editor").await.unwrap();
    let secret = admin.create_resource(&tenant, "root", "/docs/secret").await.unwrap();
    let everything = admin.create_resource(&tenant, "root", "/docs/*").await.unwrap();

    admin.add_user_to_group(&tenant, "root", user, group).await.unwrap();
    admin.assign_role_to_group(&tenant, "root", group, role).await.unwrap();
    admin
        .set_role_access(&tenant, "root", role, everything, "GET", true)
        .await
        .unwrap();
    admin
        .set_user_access(&tenant, "root", user, secret, "GET", false)
        .await
        .unwrap();

    let secret_decision = system.evaluate(&tenant, user, "GET", "/docs/secret").await;
    assert_eq!(secret_decision.decision, acs_evaluator::Decision::Deny);

    let public_decision = system.evaluate(&tenant, user, "GET", "/docs/public").await;
    assert_eq!(public_decision.decision, acs_evaluator::Decision::Allow);
}

#[tokio::test]
async fn role_granted_to_a_parent_group_reaches_a_transitive_member() {
    let system = system().await;
    let tenant = TenantId::new("acme");
    let admin = system.admin();

    let user = admin.create_user(&tenant, "root", "member@example.com").await.unwrap();
    let parent = admin.create_group(&tenant, "root", "org").await.unwrap();
    let child = admin.create_group(&tenant, "root", "org-team").await.unwrap();
    let role = admin.create_role(&tenant, "root", "reader").await.unwrap();
    let resource = admin.create_resource(&tenant, "root", "/x").await.unwrap();

    admin.link_groups(&tenant, "root", parent, child).await.unwrap();
    admin.add_user_to_group(&tenant, "root", user, child).await.unwrap();
    admin.assign_role_to_group(&tenant, "root", parent, role).await.unwrap();
    admin
        .set_role_access(&tenant, "root", role, resource, "READ", true)
        .await
        .unwrap();

    let decision = system.evaluate(&tenant, user, "READ", "/x").await;
    assert_eq!(decision.decision, acs_evaluator::Decision::Allow);
}

#[tokio::test]
async fn linking_a_cycle_is_rejected_and_leaves_the_graph_unchanged() {
    let system = system().await;
    let tenant = TenantId::new("acme");
    let admin = system.admin();

    let a = admin.create_group(&tenant, "root", "a").await.unwrap();
    let b = admin.create_group(&tenant, "root", "b").await.unwrap();
    let c = admin.create_group(&tenant, "root", "c").await.unwrap();

    admin.link_groups(&tenant, "root", a, b).await.unwrap();
    admin.link_groups(&tenant, "root", b, c).await.unwrap();

    let err = admin.link_groups(&tenant, "root", c, a).await.unwrap_err();
    assert!(matches!(err, acs_types::AcsError::Validation(_)));
    assert!(admin.is_ancestor(&tenant, a, c).await);
    assert!(!admin.is_ancestor(&tenant, c, a).await);
}

#[tokio::test]
async fn rate_limit_exhaustion_on_one_tenant_does_not_affect_another() {
    let system = system().await;
    let t1 = TenantId::new("t1");
    let t2 = TenantId::new("t2");

    for _ in 0..100 {
        system.check_rate_limit(&t1, "shared-id", None, None).await;
    }
    let t1_status = system.rate_limit_status(&t1, "shared-id", None, None).await;
    assert!(!t1_status.allowed || t1_status.remaining == 0);

    let t2_decision = system.check_rate_limit(&t2, "shared-id", None, None).await;
    assert!(t2_decision.allowed);
}

#[tokio::test]
async fn an_empty_graph_never_produces_allow() {
    let system = system().await;
    let tenant = TenantId::new("acme");
    let user = system
        .admin()
        .create_user(&tenant, "root", "nobody@example.com")
        .await
        .unwrap();

    let decision = system.evaluate(&tenant, user, "GET", "/anything").await;
    assert_eq!(decision.decision, acs_evaluator::Decision::NotApplicable);
}
