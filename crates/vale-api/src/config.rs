//! Service configuration.
//!
//! Resolution order: built-in defaults, then the TOML file, then `VALE_*`
//! environment variables. Every leaf key has an environment name derived
//! from its dotted path: `server.port` is `VALE_SERVER_PORT`,
//! `auth.allowed_email_domains` is `VALE_AUTH_ALLOWED_EMAIL_DOMAINS`
//! (comma separated).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vale_auth::AuthConfig;
use vale_core::RegistrationRules;
use vale_core::status::DEFAULT_DUE_SOON_DAYS;
use vale_storage::DatabaseConfig;

use crate::error::{Error, Result};

/// Name used for the config directory and in messages.
pub const PROJECT_NAME: &str = "valepalete";

/// Environment variable pointing at the config file.
pub const CONFIG_ENV: &str = "VALE_CONFIG";

/// Prefix of per-key environment overrides.
pub const ENV_PREFIX: &str = "VALE";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// SQLite database
    pub database: DatabaseConfig,
    /// Authentication
    pub auth: AuthConfig,
    /// Voucher rules
    pub vales: ValesConfig,
    /// Log output
    pub logging: LoggingConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[vales]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValesConfig {
    /// Seconds between expiry sweeps; 0 disables the background sweeper
    pub expiry_sweep_secs: u64,
    /// Days before the due date during which a voucher is "due soon"
    pub due_soon_days: i64,
    /// Largest accepted proof file, in decoded bytes
    pub max_attachment_bytes: usize,
}

impl Default for ValesConfig {
    fn default() -> Self {
        Self {
            expiry_sweep_secs: 3600,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            max_attachment_bytes: 5 * 1024 * 1024,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directives; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,vale=debug".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the config file (if it exists), then the process
    /// environment.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(config_path) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if config_path.is_some() => {
                return Err(Error::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            _ => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Parses a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parses TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Explicit path, else `VALE_CONFIG`, else the platform default.
    pub fn resolve_config_path(config_path: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        Self::default_config_path()
    }

    /// `<config_dir>/valepalete/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// Every leaf setting as `(VALE_SECTION_KEY, value)`.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        collect_env_vars(&value, &mut vars);
        Ok(vars)
    }

    /// Applies `VALE_*` overrides from `vars`. Unknown variables are ignored.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut value = toml::Value::try_from(&*self).map_err(|e| Error::config(e.to_string()))?;

        let mut leaves = Vec::new();
        collect_leaf_keys(&value, "", &mut leaves);

        let mut changed = false;
        for (name, raw) in vars {
            let Some(key) = leaves.iter().find(|key| env_name(key) == name) else {
                continue;
            };
            let current = get_nested_value(&value, key)
                .ok_or_else(|| Error::config(format!("Unknown key '{key}'")))?;
            let parsed = parse_typed(current, &raw)
                .ok_or_else(|| Error::config(format!("Invalid value for {name}: '{raw}'")))?;
            set_nested_value(&mut value, key, parsed)?;
            tracing::debug!(%name, "Config override from environment");
            changed = true;
        }

        if changed {
            *self = value
                .try_into()
                .map_err(|e: toml::de::Error| Error::config(e.to_string()))?;
        }
        Ok(())
    }

    /// Registration rules derived from the `[auth]` section.
    pub fn registration_rules(&self) -> RegistrationRules {
        RegistrationRules {
            allowed_email_domains: self.auth.allowed_email_domains.clone(),
            ..RegistrationRules::default()
        }
    }
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

/// Navigate a dotted key path in a TOML value tree.
pub fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    let mut current = value;
    for part in key.split('.') {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Set a value at a dotted key path, creating intermediate tables as needed.
pub fn set_nested_value(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (parents, last) = key.rsplit_once('.').unwrap_or(("", key));
    if last.is_empty() {
        return Err(Error::config("Empty key path"));
    }

    let mut current = root;
    for part in parents.split('.').filter(|p| !p.is_empty()) {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config("Cannot navigate into a non-table value"))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    let table = current
        .as_table_mut()
        .ok_or_else(|| Error::config("Cannot set key on a non-table value"))?;
    table.insert(last.to_string(), value);
    Ok(())
}

/// Parse a string value into a TOML value, auto-detecting the type.
///
/// Priority: bool → integer → float → string.
pub fn parse_value(s: &str) -> toml::Value {
    if s == "true" {
        return toml::Value::Boolean(true);
    }
    if s == "false" {
        return toml::Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(s.to_string())
}

/// Format a TOML value for display on stdout.
pub fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(items) => items
            .iter()
            .map(format_toml_value)
            .collect::<Vec<_>>()
            .join(","),
        toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

/// Parses `raw` into the same TOML type as `current`.
fn parse_typed(current: &toml::Value, raw: &str) -> Option<toml::Value> {
    match current {
        toml::Value::String(_) => Some(toml::Value::String(raw.to_string())),
        toml::Value::Integer(_) => raw.trim().parse().ok().map(toml::Value::Integer),
        toml::Value::Float(_) => raw.trim().parse().ok().map(toml::Value::Float),
        toml::Value::Boolean(_) => match raw.trim() {
            "true" | "1" => Some(toml::Value::Boolean(true)),
            "false" | "0" => Some(toml::Value::Boolean(false)),
            _ => None,
        },
        toml::Value::Array(_) => Some(toml::Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_string()))
                .collect(),
        )),
        toml::Value::Datetime(_) | toml::Value::Table(_) => None,
    }
}

fn env_name(key: &str) -> String {
    format!("{ENV_PREFIX}_{}", key.replace('.', "_").to_uppercase())
}

fn collect_leaf_keys(value: &toml::Value, prefix: &str, out: &mut Vec<String>) {
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let key = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            if v.is_table() {
                collect_leaf_keys(v, &key, out);
            } else {
                out.push(key);
            }
        }
    }
}

fn collect_env_vars(value: &toml::Value, out: &mut Vec<(String, String)>) {
    let mut keys = Vec::new();
    collect_leaf_keys(value, "", &mut keys);
    for key in keys {
        if let Some(leaf) = get_nested_value(value, &key) {
            out.push((env_name(&key), format_toml_value(leaf)));
        }
    }
}
