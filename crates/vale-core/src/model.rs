//! Entities and the payloads that create them.
//!
//! Wire names follow the frontend contract: camelCase JSON
//! (`valorUnitario`, `dataVencimento`, ...). Operator passwords never appear
//! on [`Admin`]; only [`NewAdmin`] carries the plaintext on its way in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{AdminId, ClienteId, TransportadoraId, ValeId};
use crate::status::ValeStatus;

/// Longest accepted name for clients, carriers and operators.
pub const MAX_NAME_LEN: usize = 120;

/// Longest accepted free-text observation.
pub const MAX_OBSERVACOES_LEN: usize = 2000;

// ============================================================================
// Operators
// ============================================================================

/// Operator permission tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including operator management. At most one exists.
    Adm,
    /// Manages vouchers, clients and carriers.
    Supervisor,
    /// Read-only.
    Consultor,
}

impl Role {
    /// Stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adm => "adm",
            Self::Supervisor => "supervisor",
            Self::Consultor => "consultor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "adm" => Ok(Self::Adm),
            "supervisor" => Ok(Self::Supervisor),
            "consultor" => Ok(Self::Consultor),
            other => Err(Error::unknown_value("role", other)),
        }
    }
}

/// Whether an operator account was approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    /// Registered, waiting for the adm to approve.
    Pendente,
    /// Allowed to log in.
    Ativo,
}

impl AdminStatus {
    /// Stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::Ativo => "ativo",
        }
    }
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pendente" => Ok(Self::Pendente),
            "ativo" => Ok(Self::Ativo),
            other => Err(Error::unknown_value("status", other)),
        }
    }
}

/// An operator account, as exposed over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// Account id
    pub id: AdminId,
    /// Display name
    pub nome: String,
    /// Login email, unique
    pub email: String,
    /// Permission tier
    pub role: Role,
    /// Approval state
    pub status: AdminStatus,
    /// Registration time
    pub data_criacao: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdmin {
    /// Display name
    pub nome: String,
    /// Login email
    pub email: String,
    /// Plaintext password, hashed before storage
    pub senha: String,
    /// Requested tier
    pub role: Role,
}

/// Rules applied to self-registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRules {
    /// Email suffixes accepted for registration (e.g. `@empresa.com`).
    /// Empty accepts any domain.
    pub allowed_email_domains: Vec<String>,
    /// Minimum password length
    pub min_password_len: usize,
}

impl Default for RegistrationRules {
    fn default() -> Self {
        Self {
            allowed_email_domains: Vec::new(),
            min_password_len: 6,
        }
    }
}

impl NewAdmin {
    /// Validates and normalizes the payload (trimmed name, lowercase email).
    pub fn validated(self, rules: &RegistrationRules) -> Result<Self> {
        let nome = validate_nome("nome", &self.nome)?;
        let email = normalize_email(&self.email)?;

        if !rules.allowed_email_domains.is_empty()
            && !rules
                .allowed_email_domains
                .iter()
                .any(|domain| email.ends_with(&domain.to_lowercase()))
        {
            return Err(Error::validation_field(
                "email",
                "email domain is not allowed",
            ));
        }

        if self.senha.chars().count() < rules.min_password_len {
            return Err(Error::validation_field(
                "senha",
                format!("must have at least {} characters", rules.min_password_len),
            ));
        }

        Ok(Self {
            nome,
            email,
            senha: self.senha,
            role: self.role,
        })
    }
}

/// Query filters for listing operators.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminFilter {
    /// Only accounts with this approval state
    pub status: Option<AdminStatus>,
    /// Only accounts with this tier
    pub role: Option<Role>,
    /// Exact email match (case-insensitive)
    pub email: Option<String>,
}

/// Lowercases and sanity-checks an email address.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && domain.contains('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(Error::validation_field("email", "invalid email address"));
    }
    Ok(email)
}

// ============================================================================
// Clientes / Transportadoras
// ============================================================================

/// A client that receives pallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cliente {
    /// Client id
    pub id: ClienteId,
    /// Client name
    pub nome: String,
}

/// A carrier that moves pallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transportadora {
    /// Carrier id
    pub id: TransportadoraId,
    /// Carrier name
    pub nome: String,
}

/// Payload for registering a client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCliente {
    /// Client name
    #[serde(default)]
    pub nome: String,
}

impl NewCliente {
    /// Returns the trimmed name, rejecting blanks.
    pub fn validated(self) -> Result<Self> {
        Ok(Self {
            nome: validate_nome("nome", &self.nome)?,
        })
    }
}

/// Payload for registering a carrier.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransportadora {
    /// Carrier name
    #[serde(default)]
    pub nome: String,
}

impl NewTransportadora {
    /// Returns the trimmed name, rejecting blanks.
    pub fn validated(self) -> Result<Self> {
        Ok(Self {
            nome: validate_nome("nome", &self.nome)?,
        })
    }
}

fn validate_nome(field: &str, raw: &str) -> Result<String> {
    let nome = raw.trim();
    if nome.is_empty() {
        return Err(Error::validation_field(field, "must not be blank"));
    }
    if nome.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation_field(
            field,
            format!("must have at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(nome.to_string())
}

// ============================================================================
// Vales
// ============================================================================

/// A pallet voucher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vale {
    /// Voucher id
    pub id: ValeId,
    /// Client name
    pub cliente: String,
    /// Carrier name
    pub transportadora: String,
    /// Number of pallets
    pub quantidade: i64,
    /// Value of a single pallet
    pub valor_unitario: f64,
    /// Last valid day
    pub data_vencimento: NaiveDate,
    /// Creation time
    pub data_criacao: DateTime<Utc>,
    /// Free-text notes
    pub observacoes: Option<String>,
    /// Stored lifecycle state
    pub status: ValeStatus,
    /// Proof file, base64 or data URL
    pub arquivo_base64: Option<String>,
    /// Original file name of the proof
    pub arquivo_nome: Option<String>,
    /// When the voucher was settled
    pub data_processamento: Option<DateTime<Utc>>,
}

impl Vale {
    /// `quantidade * valorUnitario`.
    pub fn valor_total(&self) -> f64 {
        self.quantidade as f64 * self.valor_unitario
    }

    /// Both the file content and its name are present.
    pub fn has_attachment(&self) -> bool {
        matches!(
            (&self.arquivo_base64, &self.arquivo_nome),
            (Some(data), Some(name)) if !data.is_empty() && !name.is_empty()
        )
    }
}

/// Payload for issuing a voucher. Any `status` sent by the client is
/// ignored; the policy decides the initial state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVale {
    /// Client name
    pub cliente: String,
    /// Carrier name
    pub transportadora: String,
    /// Number of pallets
    pub quantidade: i64,
    /// Value of a single pallet
    pub valor_unitario: f64,
    /// Due date, `YYYY-MM-DD` or an RFC 3339 timestamp
    #[serde(deserialize_with = "due_date::deserialize")]
    pub data_vencimento: NaiveDate,
    /// Free-text notes
    #[serde(default)]
    pub observacoes: Option<String>,
}

impl NewVale {
    /// Validates and normalizes the payload.
    pub fn validated(self) -> Result<Self> {
        let cliente = validate_nome("cliente", &self.cliente)?;
        let transportadora = validate_nome("transportadora", &self.transportadora)?;

        if self.quantidade <= 0 {
            return Err(Error::validation_field("quantidade", "must be positive"));
        }
        if !self.valor_unitario.is_finite() || self.valor_unitario < 0.0 {
            return Err(Error::validation_field(
                "valorUnitario",
                "must be a non-negative number",
            ));
        }

        let observacoes = match self.observacoes.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) if text.chars().count() > MAX_OBSERVACOES_LEN => {
                return Err(Error::validation_field(
                    "observacoes",
                    format!("must have at most {MAX_OBSERVACOES_LEN} characters"),
                ));
            }
            Some(text) => Some(text.to_string()),
        };

        Ok(Self {
            cliente,
            transportadora,
            quantidade: self.quantidade,
            valor_unitario: self.valor_unitario,
            data_vencimento: self.data_vencimento,
            observacoes,
        })
    }
}

/// Query filters for listing vouchers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValeFilter {
    /// Only vouchers in this state
    pub status: Option<ValeStatus>,
    /// Case-insensitive substring of the client name
    pub cliente: Option<String>,
    /// Case-insensitive substring of the carrier name
    pub transportadora: Option<String>,
}

/// Lenient due-date parsing: the frontend sends either a bare date or the
/// ISO string produced by `Date.toISOString()`.
pub mod due_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer};

    /// Parses `YYYY-MM-DD` or an RFC 3339 timestamp, keeping the UTC date.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.to_utc().date_naive())
        })
    }

    /// Serde adapter for [`parse`].
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'")))
    }
}
