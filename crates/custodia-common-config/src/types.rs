//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustodiaConfig {
    /// Data backend selection.
    pub backend: BackendConfig,
    /// Audit log capture and persistence.
    pub audit: AuditConfig,
    /// Periodic review policy for processing activities.
    pub review: ReviewConfig,
    /// CSV and print export settings.
    pub export: ExportSettings,
    /// Default session used by the command line.
    pub session: SessionConfig,
}

/// Which data backend stores the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Volatile, process-local tables.
    Memory,
    /// Single-file SQLite database.
    #[default]
    Sqlite,
}

/// Data backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend kind.
    pub kind: BackendKind,
    /// Database file for the SQLite backend.
    pub sqlite_path: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Sqlite,
            sqlite_path: PathBuf::from(".custodia/custodia.db"),
        }
    }
}

/// Audit capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Persist audit events at all.
    pub enabled: bool,
    /// Events buffered before new ones are dropped with a warning.
    pub buffer_size: usize,
    /// Events written per batch.
    pub batch_size: usize,
    /// Maximum age of a pending batch (ms).
    pub flush_interval_ms: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_size: 1_000,
            batch_size: 50,
            flush_interval_ms: 500,
        }
    }
}

/// Review policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Days between an approval and the next scheduled review.
    pub interval_days: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self { interval_days: 365 }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// `strftime` pattern for dates.
    pub date_format: String,
    /// Title of printable documents.
    pub document_title: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            date_format: "%d/%m/%Y".to_string(),
            document_title: "Registro de Atividades de Tratamento".to_string(),
        }
    }
}

/// Default session for command line use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tenant identifier.
    pub tenant_id: Option<String>,
    /// Acting user identifier.
    pub user_id: Option<String>,
    /// Act as platform administrator.
    pub platform_admin: bool,
}
