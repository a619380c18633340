//! Notification model.
//!
//! Notifications are produced by the lead store when an admin changes the
//! status of a lead they do not own, and are only ever mutated by their
//! recipient (mark read, clear).

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{Lead, LeadStatus};

/// Kind of notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    StatusChange,
    Info,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::StatusChange => "STATUS_CHANGE",
            NotificationType::Info => "INFO",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "STATUS_CHANGE" => Some(NotificationType::StatusChange),
            "INFO" => Some(NotificationType::Info),
            _ => None,
        }
    }
}

/// A message addressed to a partner about one of their leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Recipient partner.
    pub user_id: String,
    pub lead_id: String,
    pub title: String,
    pub message: String,
    pub date: String,
    pub is_read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationType,
}

impl Notification {
    /// Build the notification for a third-party status change on `lead`.
    ///
    /// The message carries the lead's name and both status labels verbatim;
    /// the dashboard renders it as-is.
    pub fn status_change(lead: &Lead, old_status: LeadStatus, new_status: LeadStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: lead.partner_id.clone(),
            lead_id: lead.id.clone(),
            title: "Mise à jour dossier".to_string(),
            message: format!(
                "Le statut du dossier {} est passé de '{}' à '{}'.",
                lead.name,
                old_status.label(),
                new_status.label()
            ),
            date: Utc::now().to_rfc3339(),
            is_read: false,
            kind: NotificationType::StatusChange,
        }
    }
}
