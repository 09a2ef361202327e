//! Vouchers.
//!
//! Status lives in a column that is updated in place. Every status write is
//! a single conditional `UPDATE`, so two operators racing on the same
//! voucher cannot both win.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use vale_core::{Attachment, NewVale, Vale, ValeFilter, ValeId, ValeStatus};

use crate::error::{Error, Result};

const ENTITY: &str = "vale";
const COLUMNS: &str = "id, cliente, transportadora, quantidade, valor_unitario, \
     data_vencimento, data_criacao, observacoes, status, arquivo_base64, arquivo_nome, \
     data_processamento";

#[derive(Debug, FromRow)]
struct ValeRow {
    id: String,
    cliente: String,
    transportadora: String,
    quantidade: i64,
    valor_unitario: f64,
    data_vencimento: NaiveDate,
    data_criacao: DateTime<Utc>,
    observacoes: Option<String>,
    status: String,
    arquivo_base64: Option<String>,
    arquivo_nome: Option<String>,
    data_processamento: Option<DateTime<Utc>>,
}

impl TryFrom<ValeRow> for Vale {
    type Error = Error;

    fn try_from(row: ValeRow) -> Result<Self> {
        Ok(Vale {
            id: row.id.parse().map_err(|e| Error::corrupt(ENTITY, e))?,
            cliente: row.cliente,
            transportadora: row.transportadora,
            quantidade: row.quantidade,
            valor_unitario: row.valor_unitario,
            data_vencimento: row.data_vencimento,
            data_criacao: row.data_criacao,
            observacoes: row.observacoes,
            status: row.status.parse().map_err(|e| Error::corrupt(ENTITY, e))?,
            arquivo_base64: row.arquivo_base64,
            arquivo_nome: row.arquivo_nome,
            data_processamento: row.data_processamento,
        })
    }
}

/// Repository for the `vales` table.
#[derive(Debug, Clone, Copy)]
pub struct ValeRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ValeRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a voucher with the given initial status.
    ///
    /// `new` must already be validated; `status` comes from
    /// `StatusPolicy::initial_status` and is never `processado`.
    pub async fn create(&self, new: &NewVale, status: ValeStatus) -> Result<Vale> {
        if status == ValeStatus::Processado {
            return Err(Error::conflict("a new vale cannot start processado"));
        }

        let vale = Vale {
            id: ValeId::new(),
            cliente: new.cliente.clone(),
            transportadora: new.transportadora.clone(),
            quantidade: new.quantidade,
            valor_unitario: new.valor_unitario,
            data_vencimento: new.data_vencimento,
            data_criacao: Utc::now(),
            observacoes: new.observacoes.clone(),
            status,
            arquivo_base64: None,
            arquivo_nome: None,
            data_processamento: None,
        };

        sqlx::query(&format!(
            "INSERT INTO vales ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(vale.id.to_string())
        .bind(&vale.cliente)
        .bind(&vale.transportadora)
        .bind(vale.quantidade)
        .bind(vale.valor_unitario)
        .bind(vale.data_vencimento)
        .bind(vale.data_criacao)
        .bind(&vale.observacoes)
        .bind(vale.status.as_str())
        .bind(&vale.arquivo_base64)
        .bind(&vale.arquivo_nome)
        .bind(vale.data_processamento)
        .execute(self.pool)
        .await?;

        tracing::info!(id = %vale.id, status = %vale.status, "Vale created");
        Ok(vale)
    }

    /// Lists vouchers, earliest due date first.
    ///
    /// Name filters are case-insensitive substring matches.
    pub async fn list(&self, filter: &ValeFilter) -> Result<Vec<Vale>> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM vales WHERE 1 = 1"));

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(cliente) = non_blank(&filter.cliente) {
            query
                .push(" AND instr(lower(cliente), ")
                .push_bind(cliente.to_lowercase())
                .push(") > 0");
        }
        if let Some(transportadora) = non_blank(&filter.transportadora) {
            query
                .push(" AND instr(lower(transportadora), ")
                .push_bind(transportadora.to_lowercase())
                .push(") > 0");
        }
        query.push(" ORDER BY data_vencimento ASC, data_criacao ASC");

        let rows: Vec<ValeRow> = query.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(Vale::try_from).collect()
    }

    /// Fetches one voucher.
    pub async fn get(&self, id: ValeId) -> Result<Vale> {
        let row: Option<ValeRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM vales WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(self.pool)
                .await?;
        row.ok_or_else(|| Error::not_found(ENTITY, id))?.try_into()
    }

    /// Moves a voucher from `from` to `to`.
    ///
    /// Compare-and-set: fails with [`Error::Conflict`] if the stored status
    /// is no longer `from`. `data_processamento` is stamped when moving to
    /// `processado`.
    pub async fn update_status(
        &self,
        id: ValeId,
        from: ValeStatus,
        to: ValeStatus,
    ) -> Result<Vale> {
        let processed_at = (to == ValeStatus::Processado).then(Utc::now);

        let result = sqlx::query(
            "UPDATE vales SET status = ?, data_processamento = COALESCE(?, data_processamento) \
             WHERE id = ? AND status = ?",
        )
        .bind(to.as_str())
        .bind(processed_at)
        .bind(id.to_string())
        .bind(from.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get(id).await?;
            return Err(Error::conflict(format!(
                "vale {id} is {}, expected {from}",
                current.status
            )));
        }

        tracing::info!(%id, %from, %to, "Vale status changed");
        self.get(id).await
    }

    /// Stores the proof file. Only open (`acumulado`) vouchers accept files.
    pub async fn attach_file(&self, id: ValeId, attachment: &Attachment) -> Result<Vale> {
        let result = sqlx::query(
            "UPDATE vales SET arquivo_base64 = ?, arquivo_nome = ? \
             WHERE id = ? AND status = 'acumulado'",
        )
        .bind(attachment.arquivo_base64.trim())
        .bind(attachment.file_name())
        .bind(id.to_string())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = self.get(id).await?;
            return Err(Error::conflict(format!(
                "vale {id} is {}, files can only be attached while acumulado",
                current.status
            )));
        }

        tracing::info!(%id, arquivo = attachment.file_name(), "Vale file attached");
        self.get(id).await
    }

    /// Deletes a voucher.
    pub async fn delete(&self, id: ValeId) -> Result<()> {
        let result = sqlx::query("DELETE FROM vales WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found(ENTITY, id));
        }
        tracing::info!(%id, "Vale deleted");
        Ok(())
    }

    /// Marks every open voucher due before `today` as `vencido`.
    ///
    /// Returns the number of vouchers expired.
    pub async fn expire_overdue(&self, today: NaiveDate) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE vales SET status = 'vencido' \
             WHERE status = 'acumulado' AND data_vencimento < ?",
        )
        .bind(today)
        .execute(self.pool)
        .await?;

        let expired = result.rows_affected();
        if expired > 0 {
            tracing::info!(expired, %today, "Expired overdue vales");
        }
        Ok(expired)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
