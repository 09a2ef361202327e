//! Clients and carriers.

use http::StatusCode;
use serde_json::json;

use crate::common::TestHarness;

#[tokio::test]
async fn test_blank_cliente_name_is_bad_request() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let (status, body) = harness.post("/api/clientes", &adm, json!({ "nome": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = harness.post("/api/clientes", &adm, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_list_delete_cliente() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let (status, created) = harness
        .post("/api/clientes", &adm, json!({ "nome": "  Mercado Zeta " }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["nome"], "Mercado Zeta");
    harness
        .post("/api/clientes", &adm, json!({ "nome": "atacadão Alfa" }))
        .await;

    let (status, list) = harness.get("/api/clientes", &adm).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["nome"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["atacadão Alfa", "Mercado Zeta"]);

    let id = created["id"].as_str().unwrap();
    let (status, _) = harness.delete(&format!("/api/clientes/{id}"), &adm).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = harness.get("/api/clientes", &adm).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = harness.delete(&format!("/api/clientes/{id}"), &adm).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transportadoras_roundtrip() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let (status, created) = harness
        .post("/api/transportadoras", &adm, json!({ "nome": "Expresso Azul" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = harness.get("/api/transportadoras", &adm).await;
    assert_eq!(list[0]["nome"], "Expresso Azul");

    let id = created["id"].as_str().unwrap();
    let (status, _) = harness
        .delete(&format!("/api/transportadoras/{id}"), &adm)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_bad_id_is_bad_request() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let (status, body) = harness.delete("/api/clientes/nao-e-uuid", &adm).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
