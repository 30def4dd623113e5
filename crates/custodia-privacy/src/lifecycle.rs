//! Activity status state machine.
//!
//! ```text
//! under_review --approve--> active
//! under_review --reject---> suspended
//! active ------suspend----> suspended
//! suspended ---reactivate-> active
//! ```

use crate::activity::{ActivityStatus, ProcessingActivity};
use custodia_common_core::Timestamp;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// A requested status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(tag = "action", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleAction {
    Approve,
    Reject { reason: String },
    Suspend { reason: String },
    Reactivate,
}

impl LifecycleAction {
    fn reason(&self) -> Option<&str> {
        match self {
            Self::Reject { reason } | Self::Suspend { reason } => Some(reason),
            Self::Approve | Self::Reactivate => None,
        }
    }
}

/// A status change that the lifecycle does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("cannot {action} an activity that is {from}")]
    NotAllowed {
        from: ActivityStatus,
        action: String,
    },

    #[error("{action} requires a reason")]
    MissingReason { action: String },
}

/// Next status for `action` applied to `current`.
pub fn transition(
    current: ActivityStatus,
    action: &LifecycleAction,
) -> Result<ActivityStatus, InvalidTransition> {
    if action.reason().is_some_and(|r| r.trim().is_empty()) {
        return Err(InvalidTransition::MissingReason {
            action: action.to_string(),
        });
    }

    use ActivityStatus::*;
    match (current, action) {
        (UnderReview, LifecycleAction::Approve) => Ok(Active),
        (UnderReview, LifecycleAction::Reject { .. }) => Ok(Suspended),
        (Active, LifecycleAction::Suspend { .. }) => Ok(Suspended),
        (Suspended, LifecycleAction::Reactivate) => Ok(Active),
        (from, action) => Err(InvalidTransition::NotAllowed {
            from,
            action: action.to_string(),
        }),
    }
}

/// Apply `action` to an activity, keeping status and suspension fields
/// consistent: a suspended activity always has a reason and a timestamp,
/// any other status has neither.
pub fn apply_transition(
    activity: &mut ProcessingActivity,
    action: &LifecycleAction,
    now: Timestamp,
) -> Result<ActivityStatus, InvalidTransition> {
    let next = transition(activity.status, action)?;

    activity.status = next;
    if next == ActivityStatus::Suspended {
        activity.suspension_reason = action.reason().map(|r| r.trim().to_string());
        activity.suspended_at = Some(now);
    } else {
        activity.suspension_reason = None;
        activity.suspended_at = None;
    }
    activity.updated_at = now;

    Ok(next)
}
