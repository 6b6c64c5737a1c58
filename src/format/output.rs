use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tickets_lib::Ticket;

/// A ticket as seen by HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketView {
    #[serde(rename = "_id")]
    pub id: String,
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub created_by: String,
    pub assigned_to: String,
    pub open: bool,
    pub status_text: String,
}

impl From<Ticket> for TicketView {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            project: ticket.project,
            issue_title: ticket.issue_title,
            issue_text: ticket.issue_text,
            created_on: ticket.created_on,
            updated_on: ticket.updated_on,
            created_by: ticket.created_by,
            assigned_to: ticket.assigned_to,
            open: ticket.open,
            status_text: ticket.status_text,
        }
    }
}

/// Successful update/delete acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub result: String,
    #[serde(rename = "_id")]
    pub id: String,
}

impl MutationResult {
    #[must_use]
    pub fn updated(id: impl Into<String>) -> Self {
        Self {
            result: "successfully updated".to_string(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn deleted(id: impl Into<String>) -> Self {
        Self {
            result: "successfully deleted".to_string(),
            id: id.into(),
        }
    }
}
