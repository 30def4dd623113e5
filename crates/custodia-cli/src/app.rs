//! Wiring from configuration to a running register.

use std::sync::Arc;
use std::time::Duration;

use custodia_audit_capture::{
    spawn_pipeline, AuditAction, AuditCapture, AuditSink, BatchConfig, CaptureConfig,
};
use custodia_backend::{BackendAuditSink, DataBackend, MemoryBackend, SqliteBackend};
use custodia_common_config::{vars, BackendKind, CustodiaConfig};
use custodia_common_core::SessionContext;
use custodia_common_log::spans::tenant_span;
use custodia_export::{ExportConfig, ExportFormat};
use custodia_privacy::{ActivityStore, StoreConfig};
use tokio::task::JoinHandle;
use tracing::{debug, warn, Span};

use crate::cli::CommandContext;
use crate::error::CliError;

pub type SharedBackend = Arc<dyn DataBackend>;

/// An opened register plus the session acting on it.
pub struct App {
    pub store: ActivityStore<SharedBackend>,
    pub session: SessionContext,
    export: custodia_common_config::ExportSettings,
    audit_task: Option<JoinHandle<()>>,
}

fn open_backend(config: &CustodiaConfig) -> Result<SharedBackend, CliError> {
    match config.backend.kind {
        BackendKind::Memory => {
            debug!("Using in-memory backend");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendKind::Sqlite => {
            let path = &config.backend.sqlite_path;
            debug!(path = %path.display(), "Opening SQLite backend");
            Ok(Arc::new(SqliteBackend::open(path)?))
        }
    }
}

/// Session from configuration; `--tenant` applies to platform administrators only.
pub fn session_from(ctx: &CommandContext) -> Result<SessionContext, CliError> {
    let session = &ctx.config.session;
    let (Some(user), Some(tenant)) = (session.user_id.as_deref(), session.tenant_id.as_deref())
    else {
        return Err(CliError::config_with_hint(
            "No session configured",
            format!(
                "Set {} and {}, or session.user_id and session.tenant_id in .custodia/config.yaml",
                vars::CUSTODIA_USER_ID,
                vars::CUSTODIA_TENANT_ID
            ),
        ));
    };

    let mut context = SessionContext::parse(user, tenant).map_err(|e| CliError::Config {
        message: format!("Invalid session: {e}"),
        source: Some(Box::new(e)),
        hint: None,
    })?;

    if session.platform_admin {
        context = context.as_platform_admin();
    }
    if let Some(selected) = ctx.tenant {
        if !context.platform_admin {
            warn!(tenant = %selected, "Ignoring --tenant for a non-administrator session");
        }
        context = context.with_selected_tenant(selected);
    }
    Ok(context)
}

impl App {
    /// Open the configured backend and start audit persistence.
    pub fn open(ctx: &CommandContext) -> Result<Self, CliError> {
        let session = session_from(ctx)?;
        let config = &ctx.config;
        let backend = open_backend(config)?;

        let (audit, audit_task) = if config.audit.enabled {
            let sink: Arc<dyn AuditSink> = Arc::new(BackendAuditSink::new(backend.clone()));
            let (capture, task) = spawn_pipeline(
                CaptureConfig {
                    buffer_size: config.audit.buffer_size,
                    default_actor: None,
                },
                BatchConfig {
                    max_batch_size: config.audit.batch_size,
                    max_batch_age: Duration::from_millis(config.audit.flush_interval_ms),
                },
                sink,
            );
            (capture, Some(task))
        } else {
            (AuditCapture::disabled(), None)
        };

        if session.effective_tenant() != session.tenant_id {
            audit.record(
                audit
                    .builder(AuditAction::TenantSwitched)
                    .session(&session)
                    .metadata("home_tenant", session.tenant_id.to_string())
                    .build(),
            );
        }

        let store = ActivityStore::new(backend, audit).with_config(StoreConfig {
            review_interval_days: config.review.interval_days,
        });

        Ok(Self {
            store,
            session,
            export: config.export.clone(),
            audit_task,
        })
    }

    /// Span carrying the acting tenant and user.
    pub fn span(&self) -> Span {
        tenant_span(
            &self.session.effective_tenant().to_string(),
            &self.session.user_id.to_string(),
        )
    }

    /// Export settings for `format`, from configuration.
    pub fn export_config(&self, format: ExportFormat) -> ExportConfig {
        ExportConfig::new(format)
            .with_title(self.export.document_title.clone())
            .with_date_format(self.export.date_format.clone())
    }

    /// Drop the register and wait for pending audit events to be written.
    pub async fn shutdown(self) {
        let Self {
            store, audit_task, ..
        } = self;
        drop(store);

        if let Some(task) = audit_task {
            if let Err(e) = task.await {
                warn!(error = %e, "Audit persistence task failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use custodia_backend::{Query, AUDIT_TABLE};
    use custodia_common_core::{TenantId, UserId};

    fn context(tenant: Option<TenantId>, admin: bool) -> CommandContext {
        let mut config = CustodiaConfig::default();
        config.backend.kind = BackendKind::Memory;
        config.session.user_id = Some(UserId::new().to_string());
        config.session.tenant_id = Some(TenantId::new().to_string());
        config.session.platform_admin = admin;
        CommandContext {
            config,
            config_path: None,
            format: OutputFormat::Text,
            quiet: false,
            verbose: 0,
            tenant,
        }
    }

    #[test]
    fn test_missing_session_is_config_error() {
        let mut ctx = context(None, false);
        ctx.config.session.user_id = None;
        let err = session_from(&ctx).unwrap_err();
        assert_eq!(err.exit_status(), 2);
        assert!(err.hint().is_some_and(|h| h.contains("CUSTODIA_USER_ID")));
    }

    #[test]
    fn test_selected_tenant_requires_admin() {
        let selected = TenantId::new();

        let user = session_from(&context(Some(selected), false)).unwrap();
        assert_ne!(user.effective_tenant(), selected);

        let admin = session_from(&context(Some(selected), true)).unwrap();
        assert_eq!(admin.effective_tenant(), selected);
    }

    #[test]
    fn test_invalid_session_id() {
        let mut ctx = context(None, false);
        ctx.config.session.tenant_id = Some("acme".into());
        let err = session_from(&ctx).unwrap_err();
        assert!(err.to_string().starts_with("Invalid session"));
    }

    #[tokio::test]
    async fn test_open_memory_app_and_shutdown() {
        let ctx = context(None, false);
        let app = App::open(&ctx).unwrap();
        let config = app.export_config(ExportFormat::Html);
        assert_eq!(config.title, "Registro de Atividades de Tratamento");
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_admin_tenant_switch_is_audited() {
        let selected = TenantId::new();
        let app = App::open(&context(Some(selected), true)).unwrap();
        let backend = app.store.backend().clone();
        app.shutdown().await;

        let rows = backend
            .select(&Query::table(AUDIT_TABLE).eq("action", "tenant_switched"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["tenant_id"], selected.to_storage());
    }
}
