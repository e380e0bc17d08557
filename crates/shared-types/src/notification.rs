use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::case::DISPLAY_TIME_FORMAT;

// ---------------------------------------------------------------------------
// Stored record
// ---------------------------------------------------------------------------

/// Immutable notice about a case event.
///
/// Lawyer notices live in their own collection; reviewer notices are embedded
/// in the reviewer's user record. Both share this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub case_id: Uuid,
    pub lawyer_id: Uuid,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Build a notice addressed to `recipient`.
    ///
    /// The id is derived from `(case, recipient, message)`, so replaying the
    /// same event produces the same id and stores can drop the duplicate.
    pub fn new(
        case_id: Uuid,
        lawyer_id: Uuid,
        recipient: Uuid,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let message = message.into();
        let key = format!("{recipient}:{message}");
        Self {
            id: Uuid::new_v5(&case_id, key.as_bytes()),
            case_id,
            lawyer_id,
            message,
            timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// API Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationResponse {
    pub case_id: String,
    pub message: String,
    pub timestamp: String,
}

impl From<&Notification> for NotificationResponse {
    fn from(n: &Notification) -> Self {
        Self {
            case_id: n.case_id.to_string(),
            message: n.message.clone(),
            timestamp: n.timestamp.format(DISPLAY_TIME_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
}
