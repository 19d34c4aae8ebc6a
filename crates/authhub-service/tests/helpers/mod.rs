//! Shared test helpers for integration tests.
//!
//! These tests need a live Postgres instance configured through
//! `AUTHHUB__DATABASE__URL`, so they are `#[ignore]`d by default; run
//! them with `cargo test -- --ignored` against a scratch database.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use authhub_auth::password::{PasswordHasher, PasswordValidator};
use authhub_core::config::AppConfig;
use authhub_database::DatabasePool;
use authhub_database::repositories::{
    AssignmentRepository, GroupRepository, MembershipRepository, PermissionRepository,
    UserRepository,
};
use authhub_service::{
    AuthService, GroupService, NoopSender, PermissionService, UserService,
    user::CreateUserRequest,
};

/// Test application context wiring every service against one pool.
pub struct TestApp {
    /// Database pool for direct queries.
    pub db_pool: PgPool,
    /// Authentication service.
    pub auth: AuthService,
    /// User service.
    pub users: UserService,
    /// Group service.
    pub groups: GroupService,
    /// Permission service.
    pub permissions: PermissionService,
}

impl TestApp {
    /// Create a new test application against a clean database.
    pub async fn new() -> Self {
        let config = AppConfig::load("test").expect("Failed to load test config");

        let pool = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        let db_pool = pool.into_pool();

        authhub_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        Self::clean_database(&db_pool).await;

        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let group_repo = Arc::new(GroupRepository::new(db_pool.clone()));
        let permission_repo = Arc::new(PermissionRepository::new(db_pool.clone()));
        let membership_repo = Arc::new(MembershipRepository::new(db_pool.clone()));
        let assignment_repo = Arc::new(AssignmentRepository::new(db_pool.clone()));

        let hasher = Arc::new(PasswordHasher::new(&config.auth));
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let sender = Arc::new(NoopSender);

        let auth = AuthService::new(
            user_repo.clone(),
            permission_repo.clone(),
            assignment_repo.clone(),
            hasher.clone(),
            validator.clone(),
            sender.clone(),
            &config.auth,
        );
        let users = UserService::new(
            user_repo.clone(),
            permission_repo.clone(),
            assignment_repo.clone(),
            hasher,
            validator,
            sender,
        );
        let groups = GroupService::new(
            group_repo,
            permission_repo.clone(),
            membership_repo,
            assignment_repo,
        );
        let permissions = PermissionService::new(permission_repo);

        Self {
            db_pool,
            auth,
            users,
            groups,
            permissions,
        }
    }

    /// Create a test user with a known password and no relations.
    pub async fn create_test_user(&self, login_id: &str, password: &str) -> Uuid {
        let mut req = user_request(login_id);
        req.password = Some(password.to_string());
        let created = self
            .users
            .create(req)
            .await
            .expect("Failed to create test user");
        created.user.id
    }

    async fn clean_database(pool: &PgPool) {
        sqlx::query(
            "TRUNCATE user_permission_assignments, group_permission_assignments, \
             user_group_map, permissions, groups, users CASCADE",
        )
        .execute(pool)
        .await
        .expect("Failed to clean database");
    }
}

/// A baseline create-user request with no relations.
pub fn user_request(login_id: &str) -> CreateUserRequest {
    CreateUserRequest {
        login_id: login_id.to_string(),
        email_address: format!("{login_id}@example.com"),
        password: Some("secret99".to_string()),
        name_first: None,
        name_last: None,
        super_user: false,
        inactive_flag: false,
        password_reset_ok: false,
        group_ids: Vec::new(),
        approved_permission_ids: Vec::new(),
        denied_permission_ids: Vec::new(),
    }
}
