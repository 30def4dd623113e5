//! Explicit session context threaded through every store call.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::{TenantId, UserId};

/// Who is acting, and on which tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// The acting user.
    pub user_id: UserId,
    /// The user's own tenant.
    pub tenant_id: TenantId,
    /// Platform-wide administrators may act on any tenant.
    #[serde(default)]
    pub platform_admin: bool,
    /// Tenant picked by a platform administrator.
    #[serde(default)]
    pub selected_tenant: Option<TenantId>,
}

impl SessionContext {
    /// Context for a regular tenant user.
    pub fn new(user_id: UserId, tenant_id: TenantId) -> Self {
        Self {
            user_id,
            tenant_id,
            platform_admin: false,
            selected_tenant: None,
        }
    }

    /// Parse a context from identifier strings.
    pub fn parse(user_id: &str, tenant_id: &str) -> Result<Self> {
        let user_id = UserId::parse(user_id).map_err(|source| Error::InvalidId {
            kind: "user",
            value: user_id.to_string(),
            source,
        })?;
        let tenant_id = TenantId::parse(tenant_id).map_err(|source| Error::InvalidId {
            kind: "tenant",
            value: tenant_id.to_string(),
            source,
        })?;
        Ok(Self::new(user_id, tenant_id))
    }

    /// Mark the user as a platform administrator.
    pub fn as_platform_admin(mut self) -> Self {
        self.platform_admin = true;
        self
    }

    /// Select a tenant to act on.
    pub fn with_selected_tenant(mut self, tenant: TenantId) -> Self {
        self.selected_tenant = Some(tenant);
        self
    }

    /// The tenant every read and write is scoped to.
    ///
    /// A selected tenant only applies to platform administrators; regular
    /// users are always pinned to their own tenant.
    pub fn effective_tenant(&self) -> TenantId {
        match self.selected_tenant {
            Some(selected) if self.platform_admin => selected,
            _ => self.tenant_id,
        }
    }
}
