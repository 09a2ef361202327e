//! Registration, login and account management.

use http::StatusCode;
use serde_json::json;
use vale_core::Role;

use crate::common::{SENHA, TestHarness};

#[tokio::test]
async fn test_register_never_returns_password() {
    let harness = TestHarness::new().await;
    let (status, body) = harness.register("ana@empresa.com", Role::Adm).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("senha").is_none());
    assert!(body.get("senhaHash").is_none());
    assert_eq!(body["status"], "ativo");
    assert_eq!(body["role"], "adm");
}

#[tokio::test]
async fn test_non_adm_registration_is_pending() {
    let harness = TestHarness::new().await;
    let (status, body) = harness.register("bruno@empresa.com", Role::Supervisor).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pendente");
}

#[tokio::test]
async fn test_only_one_adm() {
    let harness = TestHarness::new().await;
    harness.register("ana@empresa.com", Role::Adm).await;

    let (status, body) = harness.register("outra@empresa.com", Role::Adm).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let harness = TestHarness::new().await;
    harness.register("carla@empresa.com", Role::Consultor).await;

    let (status, _) = harness.register("CARLA@empresa.com", Role::Supervisor).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validation() {
    let harness = TestHarness::new().await;
    let (status, body) = harness
        .send(
            http::Method::POST,
            "/api/admins",
            None,
            Some(json!({ "nome": "X", "email": "sem-arroba", "senha": SENHA, "role": "consultor" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));

    let (status, _) = harness
        .send(
            http::Method::POST,
            "/api/admins",
            None,
            Some(json!({ "nome": "X", "email": "x@empresa.com", "senha": "123", "role": "consultor" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_unknown_role_is_bad_request() {
    let harness = TestHarness::new().await;
    let (status, _) = harness
        .send(
            http::Method::POST,
            "/api/admins",
            None,
            Some(json!({ "nome": "X", "email": "x@empresa.com", "senha": SENHA, "role": "gerente" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_allowed_domains_are_enforced() {
    let mut config = crate::common::test_config();
    config.auth.allowed_email_domains = vec!["@empresa.com".to_string()];
    let harness = TestHarness::with_config(config).await;

    let (status, _) = harness.register("fora@gmail.com", Role::Consultor).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = harness.register("dentro@empresa.com", Role::Consultor).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_pending_user_cannot_login() {
    let harness = TestHarness::new().await;
    harness.register("dani@empresa.com", Role::Consultor).await;

    let (status, body) = harness.login("dani@empresa.com", SENHA).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_approved_user_can_login() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let (_, created) = harness.register("edu@empresa.com", Role::Consultor).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = harness
        .put(&format!("/api/admins/{id}/status"), &adm, json!({ "status": "ativo" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ativo");

    let (status, body) = harness.login("edu@empresa.com", SENHA).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert!(body["expiresAt"].is_string());
    assert_eq!(body["usuario"]["email"], "edu@empresa.com");
    assert!(body["usuario"].get("senha").is_none());
}

#[tokio::test]
async fn test_login_failures_are_unauthorized() {
    let harness = TestHarness::new().await;
    harness.adm_token().await;

    let (status, wrong_password) = harness.login("adm@empresa.com", "errada").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, unknown_email) = harness.login("ninguem@empresa.com", SENHA).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email, "responses must not reveal which emails exist");
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let harness = TestHarness::new().await;
    harness.register("Fabi@Empresa.com", Role::Adm).await;
    let (status, _) = harness.login("fabi@empresa.com", SENHA).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_admins_filters_and_hides_passwords() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    harness.register("g@empresa.com", Role::Consultor).await;
    harness.register("h@empresa.com", Role::Supervisor).await;

    let (status, body) = harness.get("/api/admins", &adm).await;
    assert_eq!(status, StatusCode::OK);
    let all = body.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|a| a.get("senha").is_none()));

    let (_, body) = harness.get("/api/admins?status=pendente", &adm).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = harness.get("/api/admins?role=supervisor", &adm).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["email"], "h@empresa.com");
}

#[tokio::test]
async fn test_adm_cannot_be_demoted_or_deleted() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let (_, list) = harness.get("/api/admins?role=adm", &adm).await;
    let id = list[0]["id"].as_str().unwrap().to_string();

    let (status, _) = harness
        .put(&format!("/api/admins/{id}/role"), &adm, json!({ "role": "consultor" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = harness.delete(&format!("/api/admins/{id}"), &adm).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_promote_to_adm_conflicts_while_one_exists() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let (_, created) = harness.register("i@empresa.com", Role::Supervisor).await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = harness
        .put(&format!("/api/admins/{id}/role"), &adm, json!({ "role": "adm" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = harness
        .put(&format!("/api/admins/{id}/role"), &adm, json!({ "role": "consultor" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "consultor");
}

#[tokio::test]
async fn test_delete_account() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let (_, created) = harness.register("j@empresa.com", Role::Consultor).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = harness.delete(&format!("/api/admins/{id}"), &adm).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = harness.delete(&format!("/api/admins/{id}"), &adm).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_supervisor_cannot_manage_users() {
    let harness = TestHarness::new().await;
    harness.adm_token().await;
    let sup = harness.token_for("sup@empresa.com", Role::Supervisor).await;

    let (status, body) = harness.get("/api/admins", &sup).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());
}
