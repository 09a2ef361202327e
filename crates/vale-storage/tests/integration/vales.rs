//! Voucher persistence and status updates.

use chrono::Duration;
use vale_core::{Attachment, ValeFilter, ValeId, ValeStatus};
use vale_storage::Error;

use crate::common::{TestHarness, new_vale, today};

fn attachment() -> Attachment {
    Attachment {
        arquivo_base64: "data:application/pdf;base64,JVBERi0=".to_string(),
        arquivo_nome: "comprovante.pdf".to_string(),
    }
}

#[tokio::test]
async fn test_create_and_get() {
    let harness = TestHarness::new().await;
    let created = harness.vale_due_in(10).await;

    let fetched = harness.db.vales().get(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.data_vencimento, created.data_vencimento);
    assert_eq!(fetched.status, ValeStatus::Acumulado);
    assert_eq!(fetched.valor_total(), 24.0 * 42.0);
}

#[tokio::test]
async fn test_create_rejects_processado() {
    let harness = TestHarness::new().await;
    let err = harness
        .db
        .vales()
        .create(&new_vale(today()), ValeStatus::Processado)
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let harness = TestHarness::new().await;
    let vale = harness.vale_due_in(5).await;

    harness.db.vales().delete(vale.id).await.unwrap();

    let err = harness.db.vales().get(vale.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { entity: "vale", .. }));
}

#[tokio::test]
async fn test_list_orders_by_due_date_and_filters() {
    let harness = TestHarness::new().await;
    let vales = harness.db.vales();

    let mut other = new_vale(today() + Duration::days(1));
    other.cliente = "Atacadão Leste".to_string();
    other.transportadora = "Rápido Norte".to_string();
    vales.create(&other, ValeStatus::Acumulado).await.unwrap();
    harness.vale_due_in(30).await;
    harness.vale_due_in(2).await;

    let all = vales.list(&ValeFilter::default()).await.unwrap();
    let dues: Vec<_> = all.iter().map(|v| v.data_vencimento).collect();
    let mut sorted = dues.clone();
    sorted.sort();
    assert_eq!(dues, sorted);

    let boa = vales
        .list(&ValeFilter {
            cliente: Some("boa COMPRA".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(boa.len(), 2);

    let norte = vales
        .list(&ValeFilter {
            transportadora: Some("norte".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(norte.len(), 1);
    assert_eq!(norte[0].cliente, "Atacadão Leste");
}

#[tokio::test]
async fn test_update_status_is_compare_and_set() {
    let harness = TestHarness::new().await;
    let vales = harness.db.vales();
    let vale = harness.vale_due_in(5).await;

    let processed = vales
        .update_status(vale.id, ValeStatus::Acumulado, ValeStatus::Processado)
        .await
        .unwrap();
    assert_eq!(processed.status, ValeStatus::Processado);
    assert!(processed.data_processamento.is_some());

    // A second writer still believing the voucher is open loses.
    let err = vales
        .update_status(vale.id, ValeStatus::Acumulado, ValeStatus::Vencido)
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(vales.get(vale.id).await.unwrap().status, ValeStatus::Processado);
}

#[tokio::test]
async fn test_update_status_missing_is_not_found() {
    let harness = TestHarness::new().await;
    let err = harness
        .db
        .vales()
        .update_status(ValeId::new(), ValeStatus::Acumulado, ValeStatus::Processado)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_attach_file_only_while_open() {
    let harness = TestHarness::new().await;
    let vales = harness.db.vales();
    let vale = harness.vale_due_in(5).await;

    let with_file = vales.attach_file(vale.id, &attachment()).await.unwrap();
    assert!(with_file.has_attachment());
    assert_eq!(with_file.arquivo_nome.as_deref(), Some("comprovante.pdf"));

    vales
        .update_status(vale.id, ValeStatus::Acumulado, ValeStatus::Processado)
        .await
        .unwrap();
    assert!(vales.attach_file(vale.id, &attachment()).await.unwrap_err().is_conflict());
}

#[tokio::test]
async fn test_expire_overdue_spares_due_today_and_processed() {
    let harness = TestHarness::new().await;
    let vales = harness.db.vales();

    let overdue = harness.vale_due_in(-1).await;
    let due_today = harness.vale_due_in(0).await;
    let processed = harness.vale_due_in(-3).await;
    vales
        .update_status(processed.id, ValeStatus::Acumulado, ValeStatus::Processado)
        .await
        .unwrap();

    assert_eq!(vales.expire_overdue(today()).await.unwrap(), 1);
    assert_eq!(vales.get(overdue.id).await.unwrap().status, ValeStatus::Vencido);
    assert_eq!(vales.get(due_today.id).await.unwrap().status, ValeStatus::Acumulado);
    assert_eq!(vales.get(processed.id).await.unwrap().status, ValeStatus::Processado);

    assert_eq!(vales.expire_overdue(today()).await.unwrap(), 0);
}
