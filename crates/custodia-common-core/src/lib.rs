//! Custodia common core types and utilities.

pub mod error;
pub mod id;
pub mod session;
pub mod timestamp;

pub use error::{Error, Result};
pub use id::{ActivityId, AuditEventId, IdParseError, TenantId, UserId};
pub use session::SessionContext;
pub use timestamp::Timestamp;
