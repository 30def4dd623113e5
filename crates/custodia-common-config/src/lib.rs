//! Configuration types for Custodia.
//!
//! This crate provides the configuration used by the Custodia register
//! and command line, read from `.custodia/config.yaml` files.

pub mod env;
pub mod loader;
pub mod types;


pub use env::*;
pub use loader::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_sensible_values() {
        let config = CustodiaConfig::default();

        assert_eq!(config.backend.kind, BackendKind::Sqlite);
        assert_eq!(
            config.backend.sqlite_path,
            std::path::PathBuf::from(".custodia/custodia.db")
        );

        assert!(config.audit.enabled);
        assert_eq!(config.audit.buffer_size, 1_000);
        assert_eq!(config.audit.batch_size, 50);
        assert_eq!(config.audit.flush_interval_ms, 500);

        assert_eq!(config.review.interval_days, 365);
        assert_eq!(config.export.date_format, "%d/%m/%Y");

        assert!(config.session.tenant_id.is_none());
        assert!(!config.session.platform_admin);
    }

    #[test]
    fn test_config_serializes_to_yaml() {
        let yaml = serde_yaml::to_string(&CustodiaConfig::default()).unwrap();

        assert!(yaml.contains("backend:"));
        assert!(yaml.contains("audit:"));
        assert!(yaml.contains("review:"));
        assert!(yaml.contains("export:"));
        assert!(yaml.contains("kind: sqlite"));
        assert!(yaml.contains("interval_days: 365"));
    }

    #[test]
    fn test_partial_configs_merge_with_defaults() {
        let partial_yaml = r#"
audit:
  batch_size: 10
session:
  platform_admin: true
"#;

        let config: CustodiaConfig = serde_yaml::from_str(partial_yaml).unwrap();

        assert_eq!(config.audit.batch_size, 10);
        assert!(config.session.platform_admin);
        assert_eq!(config.audit.buffer_size, 1_000);
        assert_eq!(config.review.interval_days, 365);
    }

    #[test]
    fn test_backend_kind_uses_snake_case() {
        let kind: BackendKind = serde_yaml::from_str("memory").unwrap();
        assert_eq!(kind, BackendKind::Memory);
        assert!(serde_yaml::to_string(&BackendKind::Sqlite)
            .unwrap()
            .contains("sqlite"));
    }
}
