//! Voucher lifecycle over HTTP.

use chrono::Duration;
use http::StatusCode;
use serde_json::{Value, json};
use vale_core::{NewVale, ValeStatus};

use crate::common::{TestHarness, proof, vale_payload};

fn id_of(vale: &Value) -> String {
    vale["id"].as_str().unwrap().to_string()
}

/// Inserts an already-overdue open voucher, bypassing the API's
/// creation-time status.
async fn stale_overdue_vale(harness: &TestHarness) -> String {
    let new = NewVale {
        cliente: "Distribuidora Leste".to_string(),
        transportadora: "Via Sul".to_string(),
        quantidade: 3,
        valor_unitario: 20.0,
        data_vencimento: harness.today() - Duration::days(2),
        observacoes: None,
    };
    let vale = harness
        .state
        .db
        .vales()
        .create(&new, ValeStatus::Acumulado)
        .await
        .unwrap();
    vale.id.to_string()
}

#[tokio::test]
async fn test_create_vale() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let vale = harness.vale_due_in(&adm, 10).await;
    assert_eq!(vale["status"], "acumulado");
    assert_eq!(vale["urgencia"], "noPrazo");
    assert_eq!(vale["valorTotal"], 355.0);
    assert_eq!(vale["observacoes"], "Paletes PBR");
    assert!(vale["dataCriacao"].is_string());
}

#[tokio::test]
async fn test_client_status_is_ignored_on_create() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let mut payload = vale_payload(harness.today() + Duration::days(5));
    payload["status"] = json!("processado");
    let (status, vale) = harness.post("/api/vales", &adm, payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vale["status"], "acumulado");
}

#[tokio::test]
async fn test_create_overdue_starts_vencido() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let (status, vale) = harness
        .post("/api/vales", &adm, vale_payload(harness.today() - Duration::days(1)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vale["status"], "vencido");
    assert!(vale["urgencia"].is_null());
}

#[tokio::test]
async fn test_create_accepts_iso_timestamp_due_date() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let mut payload = vale_payload(harness.today());
    payload["dataVencimento"] = json!("2099-05-20T03:00:00.000Z");
    let (status, vale) = harness.post("/api/vales", &adm, payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vale["dataVencimento"], "2099-05-20");
}

#[tokio::test]
async fn test_create_validation() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let mut payload = vale_payload(harness.today());
    payload["quantidade"] = json!(0);
    let (status, _) = harness.post("/api/vales", &adm, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut payload = vale_payload(harness.today());
    payload["cliente"] = json!("");
    let (status, _) = harness.post("/api/vales", &adm, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut payload = vale_payload(harness.today());
    payload["dataVencimento"] = json!("amanhã");
    let (status, _) = harness.post("/api/vales", &adm, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let (status, body) = harness
        .get("/api/vales/00000000-0000-4000-8000-000000000000", &adm)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let id = id_of(&harness.vale_due_in(&adm, 3).await);

    let (status, _) = harness.delete(&format!("/api/vales/{id}"), &adm).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = harness.get(&format!("/api/vales/{id}"), &adm).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    harness.vale_due_in(&adm, 10).await;

    let mut other = vale_payload(harness.today() + Duration::days(2));
    other["cliente"] = json!("Padaria Pão Quente");
    other["transportadora"] = json!("Rodonorte");
    harness.post("/api/vales", &adm, other).await;

    let (_, all) = harness.get("/api/vales", &adm).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["cliente"], "Padaria Pão Quente", "earliest due first");

    let (_, list) = harness.get("/api/vales?cliente=padaria", &adm).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, list) = harness.get("/api/vales?transportadora=AZUL", &adm).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, list) = harness.get("/api/vales?status=processado", &adm).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = harness.get("/api/vales?status=perdido", &adm).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_baixa_requires_attachment() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let id = id_of(&harness.vale_due_in(&adm, 10).await);

    let (status, body) = harness
        .post(&format!("/api/vales/{id}/processar"), &adm, json!({ "modo": "baixa" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, vale) = harness
        .put(&format!("/api/vales/{id}/arquivo"), &adm, proof())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vale["arquivoNome"], "comprovante.pdf");

    let (status, vale) = harness
        .post(&format!("/api/vales/{id}/processar"), &adm, json!({ "modo": "baixa" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vale["status"], "processado");
    assert!(vale["dataProcessamento"].is_string());

    let (status, _) = harness
        .post(&format!("/api/vales/{id}/processar"), &adm, json!({ "modo": "baixa" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "processado is final");
}

#[tokio::test]
async fn test_contato_cliente_only_when_due_soon() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;

    let far = id_of(&harness.vale_due_in(&adm, 10).await);
    let (status, _) = harness
        .post(
            &format!("/api/vales/{far}/processar"),
            &adm,
            json!({ "modo": "contatoCliente" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let soon = harness.vale_due_in(&adm, 3).await;
    assert_eq!(soon["urgencia"], "venceEmBreve");
    let soon = id_of(&soon);
    let (status, vale) = harness
        .post(
            &format!("/api/vales/{soon}/processar"),
            &adm,
            json!({ "modo": "contatoCliente" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vale["status"], "processado");
}

#[tokio::test]
async fn test_unknown_mode_is_bad_request() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let id = id_of(&harness.vale_due_in(&adm, 1).await);

    let (status, _) = harness
        .post(&format!("/api/vales/{id}/processar"), &adm, json!({ "modo": "perdão" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_read_sweeps_overdue() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let id = stale_overdue_vale(&harness).await;

    let (status, vale) = harness.get(&format!("/api/vales/{id}"), &adm).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vale["status"], "vencido");
}

#[tokio::test]
async fn test_expirar_reports_count() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    stale_overdue_vale(&harness).await;
    stale_overdue_vale(&harness).await;
    harness.vale_due_in(&adm, 5).await;

    let (status, body) = harness.post("/api/vales/expirar", &adm, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "expirados": 2 }));

    let (_, body) = harness.post("/api/vales/expirar", &adm, json!({})).await;
    assert_eq!(body["expirados"], 0);
}

#[tokio::test]
async fn test_processado_never_expires() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let id = stale_overdue_vale(&harness).await;
    let vale_id = id.parse().unwrap();
    harness
        .state
        .db
        .vales()
        .update_status(vale_id, ValeStatus::Acumulado, ValeStatus::Processado)
        .await
        .unwrap();

    let (_, body) = harness.post("/api/vales/expirar", &adm, json!({})).await;
    assert_eq!(body["expirados"], 0);
    let (_, vale) = harness.get(&format!("/api/vales/{id}"), &adm).await;
    assert_eq!(vale["status"], "processado");
}

#[tokio::test]
async fn test_put_status_transitions() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let id = id_of(&harness.vale_due_in(&adm, 4).await);

    let (status, vale) = harness
        .put(&format!("/api/vales/{id}"), &adm, json!({ "status": "acumulado" }))
        .await;
    assert_eq!(status, StatusCode::OK, "same status is a no-op");
    assert_eq!(vale["status"], "acumulado");

    let (status, _) = harness
        .put(&format!("/api/vales/{id}"), &adm, json!({ "status": "vencido" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "not overdue yet");

    let (status, _) = harness
        .put(&format!("/api/vales/{id}"), &adm, json!({ "status": "processado" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "no proof attached");

    harness
        .put(&format!("/api/vales/{id}/arquivo"), &adm, proof())
        .await;
    let (status, vale) = harness
        .put(&format!("/api/vales/{id}"), &adm, json!({ "status": "processado" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vale["status"], "processado");

    let (status, _) = harness
        .put(&format!("/api/vales/{id}"), &adm, json!({ "status": "acumulado" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_attachment_rules() {
    let mut config = crate::common::test_config();
    config.vales.max_attachment_bytes = 4;
    let harness = TestHarness::with_config(config).await;
    let adm = harness.adm_token().await;
    let id = id_of(&harness.vale_due_in(&adm, 4).await);
    let uri = format!("/api/vales/{id}/arquivo");

    let (status, _) = harness
        .put(&uri, &adm, json!({ "arquivoBase64": "%%%", "arquivoNome": "x.pdf" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = harness
        .put(&uri, &adm, json!({ "arquivoBase64": "JVBERi0=", "arquivoNome": " " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for nome in ["C:\\scans\\", "docs/"] {
        let (status, body) = harness
            .put(&uri, &adm, json!({ "arquivoBase64": "AQID", "arquivoNome": nome }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{nome}: {body}");
    }

    // 9 decoded bytes against a limit of 4
    let (status, body) = harness.put(&uri, &adm, proof()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());

    let (status, vale) = harness
        .put(&uri, &adm, json!({ "arquivoBase64": "AQID", "arquivoNome": "c:\\docs\\nf.png" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vale["arquivoNome"], "nf.png");
}

#[tokio::test]
async fn test_cannot_attach_to_vencido() {
    let harness = TestHarness::new().await;
    let adm = harness.adm_token().await;
    let id = stale_overdue_vale(&harness).await;

    let (status, _) = harness
        .put(&format!("/api/vales/{id}/arquivo"), &adm, proof())
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
