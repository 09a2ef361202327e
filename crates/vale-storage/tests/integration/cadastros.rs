//! Clients and carriers.

use vale_core::{ClienteId, TransportadoraId};
use vale_storage::{Database, DatabaseConfig};

use crate::common::TestHarness;

#[tokio::test]
async fn test_clientes_listed_by_name() {
    let harness = TestHarness::new().await;
    let clientes = harness.db.clientes();

    clientes.create("zeta Atacado").await.unwrap();
    clientes.create("Alfa Distribuidora").await.unwrap();
    clientes.create("beta Mercados").await.unwrap();

    let nomes: Vec<_> = clientes
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.nome)
        .collect();
    assert_eq!(nomes, ["Alfa Distribuidora", "beta Mercados", "zeta Atacado"]);
    assert_eq!(clientes.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_delete_cliente_then_get_is_not_found() {
    let harness = TestHarness::new().await;
    let clientes = harness.db.clientes();
    let cliente = clientes.create("Padaria Central").await.unwrap();

    clientes.delete(cliente.id).await.unwrap();

    assert!(clientes.get(cliente.id).await.unwrap_err().is_not_found());
    assert!(clientes.delete(cliente.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_transportadoras_are_separate_table() {
    let harness = TestHarness::new().await;
    let t = harness.db.transportadoras().create("Expresso Sul").await.unwrap();

    assert_eq!(harness.db.clientes().count().await.unwrap(), 0);
    assert_eq!(harness.db.transportadoras().get(t.id).await.unwrap().nome, "Expresso Sul");
    assert!(
        harness
            .db
            .transportadoras()
            .get(TransportadoraId::new())
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_file_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("vales.db").display()),
        max_connections: 2,
    };

    let id: ClienteId = {
        let db = Database::connect(&config).await.unwrap();
        db.migrate().await.unwrap();
        let cliente = db.clientes().create("Loja Persistente").await.unwrap();
        db.close().await;
        cliente.id
    };

    let db = Database::connect(&config).await.unwrap();
    db.migrate().await.unwrap();
    assert_eq!(db.clientes().get(id).await.unwrap().nome, "Loja Persistente");
}
