//! Integration tests for assignment storage and permission resolution.

mod helpers;

use authhub_core::error::ErrorKind;
use authhub_database::repositories::AssignmentRepository;
use authhub_entity::assignment::SubjectKind;
use uuid::Uuid;

use helpers::user_request;

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_user_with_direct_approval_holds_permission() {
    let app = helpers::TestApp::new().await;
    let perm = app
        .permissions
        .add_or_get("files-read", None)
        .await
        .expect("Permission should be created");

    let mut req = user_request("reader");
    req.approved_permission_ids = vec![perm.id];
    app.users.create(req).await.expect("User should be created");

    let session = app
        .auth
        .login("reader", "secret99")
        .await
        .expect("Login should succeed");

    assert!(session.has_permission("files-read"));
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_direct_denial_beats_group_approval() {
    let app = helpers::TestApp::new().await;
    let perm = app
        .permissions
        .add_or_get("reports-run", None)
        .await
        .expect("Permission should be created");
    let group = app
        .groups
        .create("analysts", &[], &[perm.id], &[])
        .await
        .expect("Group should be created");

    let mut req = user_request("blocked");
    req.group_ids = vec![group.id];
    req.denied_permission_ids = vec![perm.id];
    let created = app.users.create(req).await.expect("User should be created");

    let map = app
        .users
        .permission_map(created.user.id, true)
        .await
        .expect("Map should resolve");
    let row = map
        .iter()
        .find(|r| r.permission_name == "reports-run")
        .expect("Row should exist");

    assert_eq!(row.user_approved, Some(-1));
    assert_eq!(row.group_approved, 1);
    assert!(!row.approved);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_super_user_override_and_diagnostic_view() {
    let app = helpers::TestApp::new().await;
    app.permissions
        .add_or_get("users-admin", None)
        .await
        .expect("Permission should be created");

    let mut req = user_request("root");
    req.super_user = true;
    let created = app.users.create(req).await.expect("User should be created");

    let with_override = app
        .users
        .permission_map(created.user.id, true)
        .await
        .expect("Map should resolve");
    assert!(with_override.iter().all(|r| r.approved));

    // The diagnostic view shows what a non-super account would get:
    // nothing is assigned, so everything falls to the default deny.
    let without_override = app
        .users
        .permission_map(created.user.id, false)
        .await
        .expect("Map should resolve");
    assert!(without_override.iter().all(|r| !r.approved));
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_group_detail_buckets_approvers_and_deniers() {
    let app = helpers::TestApp::new().await;
    let perm = app
        .permissions
        .add_or_get("exports-run", None)
        .await
        .expect("Permission should be created");
    let approvers = app
        .groups
        .create("approvers", &[], &[perm.id], &[])
        .await
        .expect("Group should be created");
    let deniers = app
        .groups
        .create("deniers", &[], &[], &[perm.id])
        .await
        .expect("Group should be created");

    let mut req = user_request("contested");
    req.group_ids = vec![approvers.id, deniers.id];
    let created = app.users.create(req).await.expect("User should be created");

    let detail = app
        .users
        .permission_map_groups(created.user.id)
        .await
        .expect("Detail should resolve");
    let entry = detail.get(&perm.id).expect("Entry should exist");

    assert_eq!(entry.approved.len(), 1);
    assert_eq!(entry.approved[0].name, "approvers");
    assert_eq!(entry.denied.len(), 1);
    assert_eq!(entry.denied[0].name, "deniers");
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_replace_swaps_the_full_assignment_set() {
    let app = helpers::TestApp::new().await;
    let a = app
        .permissions
        .add_or_get("perm-a", None)
        .await
        .expect("Permission should be created");
    let b = app
        .permissions
        .add_or_get("perm-b", None)
        .await
        .expect("Permission should be created");
    let group = app
        .groups
        .create("rotating", &[], &[a.id], &[])
        .await
        .expect("Group should be created");

    app.groups
        .assign_permissions_by_name("rotating", &["perm-b"], &["perm-a"])
        .await
        .expect("Replace should succeed");

    let rows: Vec<(Uuid, i16)> = sqlx::query_as(
        "SELECT permission_id, approved FROM group_permission_assignments \
         WHERE group_id = $1 ORDER BY approved DESC",
    )
    .bind(group.id)
    .fetch_all(&app.db_pool)
    .await
    .expect("Rows should load");

    assert_eq!(rows, vec![(b.id, 1), (a.id, -1)]);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_add_to_existing_never_removes() {
    let app = helpers::TestApp::new().await;
    let a = app
        .permissions
        .add_or_get("keep-me", None)
        .await
        .expect("Permission should be created");
    app.permissions
        .add_or_get("add-me", None)
        .await
        .expect("Permission should be created");
    app.groups
        .create("growing", &[], &[a.id], &[])
        .await
        .expect("Group should be created");

    app.groups
        .add_permissions_to_existing("growing", &["add-me"], &[])
        .await
        .expect("Merge should succeed");

    let mut req = user_request("member");
    let group = app
        .groups
        .add_or_get("growing")
        .await
        .expect("Group should exist");
    req.group_ids = vec![group.id];
    let created = app.users.create(req).await.expect("User should be created");

    let map = app
        .users
        .permission_map(created.user.id, true)
        .await
        .expect("Map should resolve");
    let approved: Vec<&str> = map
        .iter()
        .filter(|r| r.approved)
        .map(|r| r.permission_name.as_str())
        .collect();

    assert!(approved.contains(&"keep-me"));
    assert!(approved.contains(&"add-me"));
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_permission_map_unknown_user_is_not_found() {
    let app = helpers::TestApp::new().await;

    let err = app
        .users
        .permission_map(Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_replace_for_missing_subject_is_not_found_even_when_empty() {
    let app = helpers::TestApp::new().await;
    let assignments = AssignmentRepository::new(app.db_pool.clone());

    // An all-empty replace touches no assignment rows, so the subject
    // check must fail it rather than letting it commit as a no-op.
    for kind in [SubjectKind::User, SubjectKind::Group] {
        let err = assignments
            .replace(kind, Uuid::new_v4(), &[], &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance"]
async fn test_replace_for_missing_group_is_not_found() {
    let app = helpers::TestApp::new().await;
    app.permissions
        .add_or_get("orphan", None)
        .await
        .expect("Permission should be created");

    let err = app
        .groups
        .assign_permissions_by_name("no-such-group", &["orphan"], &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
