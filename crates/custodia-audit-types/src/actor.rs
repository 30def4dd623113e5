//! Audit event actors.

use custodia_common_core::{SessionContext, UserId};
use serde::{Deserialize, Serialize};

/// The entity that initiated an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditActor {
    /// A human user.
    User {
        user_id: UserId,
        #[serde(default)]
        platform_admin: bool,
    },
    /// The system itself (automated processes).
    System { component: String },
    /// Unknown actor (for legacy events).
    Unknown,
}

impl AuditActor {
    /// Create a user actor.
    pub fn user(user_id: UserId) -> Self {
        Self::User {
            user_id,
            platform_admin: false,
        }
    }

    /// The actor behind a session.
    pub fn from_session(ctx: &SessionContext) -> Self {
        Self::User {
            user_id: ctx.user_id,
            platform_admin: ctx.platform_admin,
        }
    }

    /// Create a system actor.
    pub fn system(component: impl Into<String>) -> Self {
        Self::System {
            component: component.into(),
        }
    }

    /// Get a display identifier for this actor.
    pub fn identifier(&self) -> String {
        match self {
            Self::User { user_id, .. } => user_id.to_string(),
            Self::System { component } => format!("system:{}", component),
            Self::Unknown => "unknown".to_string(),
        }
    }
}
