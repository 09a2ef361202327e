//! Clients and carriers.
//!
//! Both are plain `(id, nome)` records, so they share one repository type
//! parameterized by [`Named`].

use std::marker::PhantomData;

use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;
use vale_core::{Cliente, ClienteId, Transportadora, TransportadoraId};

use crate::error::{Error, Result};

/// A record stored as `(id, nome)` in its own table.
pub trait Named: Sized + Send {
    /// Typed id
    type Id: Copy + From<Uuid> + Into<Uuid> + std::fmt::Display + Send;

    /// Table name
    const TABLE: &'static str;

    /// Entity name used in errors and logs
    const ENTITY: &'static str;

    /// Builds the record from its parts.
    fn from_parts(id: Self::Id, nome: String) -> Self;
}

impl Named for Cliente {
    type Id = ClienteId;
    const TABLE: &'static str = "clientes";
    const ENTITY: &'static str = "cliente";

    fn from_parts(id: ClienteId, nome: String) -> Self {
        Cliente { id, nome }
    }
}

impl Named for Transportadora {
    type Id = TransportadoraId;
    const TABLE: &'static str = "transportadoras";
    const ENTITY: &'static str = "transportadora";

    fn from_parts(id: TransportadoraId, nome: String) -> Self {
        Transportadora { id, nome }
    }
}

#[derive(Debug, FromRow)]
struct NamedRow {
    id: String,
    nome: String,
}

impl NamedRow {
    fn into_named<T: Named>(self) -> Result<T> {
        let uuid = Uuid::parse_str(&self.id).map_err(|e| Error::corrupt(T::ENTITY, e))?;
        Ok(T::from_parts(T::Id::from(uuid), self.nome))
    }
}

/// Repository for a [`Named`] table.
#[derive(Debug)]
pub struct NamedRepo<'a, T> {
    pool: &'a SqlitePool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for NamedRepo<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NamedRepo<'_, T> {}

impl<'a, T: Named> NamedRepo<'a, T> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Inserts a record. `nome` must already be validated.
    pub async fn create(&self, nome: &str) -> Result<T> {
        let id = Uuid::new_v4();
        sqlx::query(&format!("INSERT INTO {} (id, nome) VALUES (?, ?)", T::TABLE))
            .bind(id.to_string())
            .bind(nome)
            .execute(self.pool)
            .await?;

        tracing::info!(entity = T::ENTITY, %id, "Created");
        Ok(T::from_parts(T::Id::from(id), nome.to_string()))
    }

    /// All records, ordered by name.
    pub async fn list(&self) -> Result<Vec<T>> {
        let rows: Vec<NamedRow> = sqlx::query_as(&format!(
            "SELECT id, nome FROM {} ORDER BY nome COLLATE NOCASE, id",
            T::TABLE
        ))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(NamedRow::into_named).collect()
    }

    /// Fetches one record.
    pub async fn get(&self, id: T::Id) -> Result<T> {
        let uuid: Uuid = id.into();
        let row: Option<NamedRow> = sqlx::query_as(&format!(
            "SELECT id, nome FROM {} WHERE id = ?",
            T::TABLE
        ))
        .bind(uuid.to_string())
        .fetch_optional(self.pool)
        .await?;
        row.ok_or_else(|| Error::not_found(T::ENTITY, id))?
            .into_named()
    }

    /// Deletes a record.
    pub async fn delete(&self, id: T::Id) -> Result<()> {
        let uuid: Uuid = id.into();
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", T::TABLE))
            .bind(uuid.to_string())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found(T::ENTITY, id));
        }
        tracing::info!(entity = T::ENTITY, %id, "Deleted");
        Ok(())
    }

    /// Number of records.
    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", T::TABLE))
            .fetch_one(self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
