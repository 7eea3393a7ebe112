use std::sync::Arc;

use vls_auth::{AuthError, AuthService, JwtManager};
use vls_storage::{ClientRecord, ClientStore, InMemoryClientStore, InMemoryUserStore, PlanLimits};

fn limits() -> PlanLimits {
    PlanLimits {
        max_project_managers: 1,
        max_supervisors: 4,
        max_anpr: 2,
        max_barrier: 1,
        max_biometric: 0,
    }
}

async fn service_with_client(status: &str) -> AuthService {
    let user_store = Arc::new(InMemoryUserStore::with_default_admin());
    let client_store = Arc::new(InMemoryClientStore::new());
    client_store
        .create_client(ClientRecord {
            client_id: "tenant-1".to_string(),
            name: "Acme Logistics".to_string(),
            status: status.to_string(),
            plan_code: "basic".to_string(),
            limits: limits(),
        })
        .await
        .expect("seed client");
    let jwt = JwtManager::new("secret".to_string(), 3600, 7200);
    AuthService::new(user_store, client_store, jwt)
}

#[tokio::test]
async fn refresh_token_is_single_use_after_rotation() {
    let auth = service_with_client("active").await;

    let (_, tokens1) = auth.login("admin", "admin123").await.expect("login");
    let tokens2 = auth
        .refresh(&tokens1.refresh_token)
        .await
        .expect("refresh");
    assert_ne!(tokens1.refresh_token, tokens2.refresh_token);

    let result = auth.refresh(&tokens1.refresh_token).await;
    assert!(matches!(result, Err(AuthError::TokenInvalid)));
}

#[tokio::test]
async fn inactive_tenant_cannot_login() {
    let auth = service_with_client("inactive").await;
    let result = auth.login("admin", "admin123").await;
    assert!(matches!(result, Err(AuthError::TenantInactive)));
}

#[tokio::test]
async fn revoked_jti_blocks_refresh() {
    let auth = service_with_client("active").await;
    let user_store = Arc::new(InMemoryUserStore::with_default_admin());
    // 单独的 store 实例签出的 token 在本服务中没有绑定 jti
    let jwt = JwtManager::new("secret".to_string(), 3600, 7200);
    let other = AuthService::new(
        user_store,
        Arc::new(InMemoryClientStore::new()),
        jwt,
    );
    let (_, tokens) = other.login("admin", "admin123").await.expect("login");
    let result = auth.refresh(&tokens.refresh_token).await;
    assert!(matches!(result, Err(AuthError::TokenInvalid)));
}
