//! Environment variable handling.

use std::env;
use thiserror::Error;

use crate::types::{BackendKind, CustodiaConfig};

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Environment variable names.
pub mod vars {
    // Configuration
    pub const CUSTODIA_CONFIG: &str = "CUSTODIA_CONFIG";
    pub const CUSTODIA_ENV: &str = "CUSTODIA_ENV";

    // Backend
    pub const CUSTODIA_BACKEND: &str = "CUSTODIA_BACKEND";
    pub const CUSTODIA_DB_PATH: &str = "CUSTODIA_DB_PATH";

    // Session
    pub const CUSTODIA_TENANT_ID: &str = "CUSTODIA_TENANT_ID";
    pub const CUSTODIA_USER_ID: &str = "CUSTODIA_USER_ID";
    pub const CUSTODIA_PLATFORM_ADMIN: &str = "CUSTODIA_PLATFORM_ADMIN";

    // Development
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    ///
    /// Missing files are not an error; later files override earlier ones.
    pub fn init() -> Result<Self, EnvError> {
        let _ = dotenvy::from_filename(".env");
        let _ = dotenvy::from_filename(".env.local");

        if let Ok(env) = env::var(vars::CUSTODIA_ENV) {
            let _ = dotenvy::from_filename(format!(".env.{}", env));
        }

        Ok(Self { _guard: () })
    }

    /// Get an optional string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get a boolean variable.
    pub fn get_bool(var: &str) -> Option<bool> {
        env::var(var)
            .ok()
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// Apply environment overrides on top of a loaded configuration.
    pub fn apply_overrides(config: &mut CustodiaConfig) -> Result<(), EnvError> {
        if let Some(kind) = Self::get(vars::CUSTODIA_BACKEND) {
            config.backend.kind = match kind.to_lowercase().as_str() {
                "memory" => BackendKind::Memory,
                "sqlite" => BackendKind::Sqlite,
                other => {
                    return Err(EnvError::InvalidValue {
                        var: vars::CUSTODIA_BACKEND.to_string(),
                        message: format!("unknown backend '{other}', expected memory or sqlite"),
                    })
                }
            };
        }

        if let Some(path) = Self::get(vars::CUSTODIA_DB_PATH) {
            config.backend.sqlite_path = path.into();
        }

        if let Some(tenant) = Self::get(vars::CUSTODIA_TENANT_ID) {
            config.session.tenant_id = Some(tenant);
        }

        if let Some(user) = Self::get(vars::CUSTODIA_USER_ID) {
            config.session.user_id = Some(user);
        }

        if let Some(admin) = Self::get_bool(vars::CUSTODIA_PLATFORM_ADMIN) {
            config.session.platform_admin = admin;
        }

        Ok(())
    }
}
