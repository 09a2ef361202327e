//! Operator accounts.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use vale_core::{Admin, AdminFilter, AdminId, AdminStatus, NewAdmin, Role};

use crate::error::{Error, Result};

const ENTITY: &str = "admin";
const COLUMNS: &str = "id, nome, email, senha, role, status, data_criacao";

const EMAIL_TAKEN: &str = "email already registered";
const ADM_EXISTS: &str = "an adm account already exists";

#[derive(Debug, FromRow)]
struct AdminRow {
    id: String,
    nome: String,
    email: String,
    senha: String,
    role: String,
    status: String,
    data_criacao: DateTime<Utc>,
}

impl AdminRow {
    fn into_credentials(self) -> Result<AdminCredentials> {
        let admin = Admin {
            id: self
                .id
                .parse::<AdminId>()
                .map_err(|e| Error::corrupt(ENTITY, e))?,
            nome: self.nome,
            email: self.email,
            role: self.role.parse().map_err(|e| Error::corrupt(ENTITY, e))?,
            status: self.status.parse().map_err(|e| Error::corrupt(ENTITY, e))?,
            data_criacao: self.data_criacao,
        };
        Ok(AdminCredentials {
            admin,
            senha_hash: self.senha,
        })
    }

    fn into_admin(self) -> Result<Admin> {
        self.into_credentials().map(|c| c.admin)
    }
}

/// An account together with its password hash, used only for login.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    /// The account
    pub admin: Admin,
    /// bcrypt hash of the password
    pub senha_hash: String,
}

/// Repository for the `admins` table.
#[derive(Debug, Clone, Copy)]
pub struct AdminRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AdminRepo<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers an account.
    ///
    /// `new` must already be validated and `senha_hash` is the hashed
    /// password. The adm account is created `ativo` (there is nobody to
    /// approve it); everyone else starts `pendente`. Fails with
    /// [`Error::Conflict`] on a duplicate email or a second adm.
    pub async fn create(&self, new: &NewAdmin, senha_hash: &str) -> Result<Admin> {
        let mut tx = self.pool.begin().await?;

        if email_exists(&mut *tx, &new.email).await? {
            return Err(Error::conflict(EMAIL_TAKEN));
        }
        if new.role == Role::Adm && count_role(&mut *tx, Role::Adm).await? > 0 {
            return Err(Error::conflict(ADM_EXISTS));
        }

        let status = match new.role {
            Role::Adm => AdminStatus::Ativo,
            Role::Supervisor | Role::Consultor => AdminStatus::Pendente,
        };
        let admin = Admin {
            id: AdminId::new(),
            nome: new.nome.clone(),
            email: new.email.clone(),
            role: new.role,
            status,
            data_criacao: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO admins (id, nome, email, senha, role, status, data_criacao) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(admin.id.to_string())
        .bind(&admin.nome)
        .bind(&admin.email)
        .bind(senha_hash)
        .bind(admin.role.as_str())
        .bind(admin.status.as_str())
        .bind(admin.data_criacao)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::from_write(e, EMAIL_TAKEN))?;

        tx.commit().await?;
        tracing::info!(id = %admin.id, role = %admin.role, status = %admin.status, "Admin registered");
        Ok(admin)
    }

    /// Lists accounts, newest first.
    pub async fn list(&self, filter: &AdminFilter) -> Result<Vec<Admin>> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM admins WHERE 1 = 1"));

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(role) = filter.role {
            query.push(" AND role = ").push_bind(role.as_str());
        }
        if let Some(email) = &filter.email {
            query
                .push(" AND email = ")
                .push_bind(email.trim().to_lowercase());
        }
        query.push(" ORDER BY data_criacao DESC");

        let rows: Vec<AdminRow> = query.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(AdminRow::into_admin).collect()
    }

    /// Fetches one account.
    pub async fn get(&self, id: AdminId) -> Result<Admin> {
        fetch(&mut *self.pool.acquire().await?, id)
            .await?
            .into_admin()
    }

    /// Looks an account up by email, including its password hash.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminCredentials>> {
        let row: Option<AdminRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM admins WHERE email = ?"))
                .bind(email.trim().to_lowercase())
                .fetch_optional(self.pool)
                .await?;
        row.map(AdminRow::into_credentials).transpose()
    }

    /// Approves (or suspends) an account.
    ///
    /// The adm account always stays `ativo`.
    pub async fn set_status(&self, id: AdminId, status: AdminStatus) -> Result<Admin> {
        let result = sqlx::query("UPDATE admins SET status = ? WHERE id = ? AND role <> 'adm'")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let current = self.get(id).await?;
            if current.status == status {
                return Ok(current);
            }
            return Err(Error::conflict("the adm account cannot be suspended"));
        }
        tracing::info!(%id, %status, "Admin status changed");
        self.get(id).await
    }

    /// Changes an account's tier.
    ///
    /// The adm account cannot be demoted, and nobody can be promoted to adm
    /// while one exists.
    pub async fn set_role(&self, id: AdminId, role: Role) -> Result<Admin> {
        let mut tx = self.pool.begin().await?;
        let current = fetch(&mut *tx, id).await?.into_admin()?;

        if current.role == role {
            return Ok(current);
        }
        if current.role == Role::Adm {
            return Err(Error::conflict("the adm account cannot be demoted"));
        }
        if role == Role::Adm && count_role(&mut *tx, Role::Adm).await? > 0 {
            return Err(Error::conflict(ADM_EXISTS));
        }

        sqlx::query("UPDATE admins SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::from_write(e, ADM_EXISTS))?;

        let updated = fetch(&mut *tx, id).await?.into_admin()?;
        tx.commit().await?;
        tracing::info!(%id, %role, "Admin role changed");
        Ok(updated)
    }

    /// Deletes an account. The adm account cannot be deleted.
    pub async fn delete(&self, id: AdminId) -> Result<()> {
        let result = sqlx::query("DELETE FROM admins WHERE id = ? AND role <> 'adm'")
            .bind(id.to_string())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            // Either missing or the adm.
            self.get(id).await?;
            return Err(Error::conflict("the adm account cannot be deleted"));
        }
        tracing::info!(%id, "Admin deleted");
        Ok(())
    }

    /// Number of accounts with `role`.
    pub async fn count_by_role(&self, role: Role) -> Result<u64> {
        count_role(&mut *self.pool.acquire().await?, role).await
    }
}

async fn fetch(conn: &mut SqliteConnection, id: AdminId) -> Result<AdminRow> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM admins WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, id))
}

async fn email_exists(conn: &mut SqliteConnection, email: &str) -> Result<bool> {
    let found: Option<(String,)> = sqlx::query_as("SELECT id FROM admins WHERE email = ?")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

async fn count_role(conn: &mut SqliteConnection, role: Role) -> Result<u64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins WHERE role = ?")
        .bind(role.as_str())
        .fetch_one(&mut *conn)
        .await?;
    Ok(u64::try_from(count).unwrap_or_default())
}
