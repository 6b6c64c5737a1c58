//! Filter and patch types for ticket operations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::Ticket;

/// Exact-match filter over ticket fields.
///
/// Every populated criterion must match (conjunction). `fields` carries
/// loosely typed client-supplied pairs, typically from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub project: Option<String>,
    pub id: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl TicketFilter {
    /// Filter matching every ticket of a project.
    #[must_use]
    pub fn project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..Default::default()
        }
    }

    /// Filter matching a single ticket within a project.
    #[must_use]
    pub fn scoped(project: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            id: Some(id.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Add a client-supplied exact-match pair.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Check whether a ticket satisfies every criterion.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(ref project) = self.project {
            if ticket.project != *project {
                return false;
            }
        }
        if let Some(ref id) = self.id {
            if ticket.id != *id {
                return false;
            }
        }
        self.fields
            .iter()
            .all(|(key, value)| field_matches(ticket, key, value))
    }
}

/// Compare one loosely typed pair against a ticket.
///
/// Unknown keys are ignored. Values that cannot be parsed for a typed
/// field (`open`, timestamps) never match.
fn field_matches(ticket: &Ticket, key: &str, value: &str) -> bool {
    match key {
        "_id" | "id" => ticket.id == value,
        "project" => ticket.project == value,
        "issue_title" => ticket.issue_title == value,
        "issue_text" => ticket.issue_text == value,
        "created_by" => ticket.created_by == value,
        "assigned_to" => ticket.assigned_to == value,
        "status_text" => ticket.status_text == value,
        "open" => parse_bool(value).is_some_and(|open| ticket.open == open),
        "created_on" => parse_timestamp(value).is_some_and(|ts| ticket.created_on == ts),
        "updated_on" => parse_timestamp(value).is_some_and(|ts| ticket.updated_on == ts),
        _ => true,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Fields to overwrite on a ticket. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketPatch {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl TicketPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }

    /// Overwrite the supplied fields on `ticket`.
    pub fn apply_to(&self, ticket: &mut Ticket) {
        if let Some(ref title) = self.issue_title {
            ticket.issue_title.clone_from(title);
        }
        if let Some(ref text) = self.issue_text {
            ticket.issue_text.clone_from(text);
        }
        if let Some(ref created_by) = self.created_by {
            ticket.created_by.clone_from(created_by);
        }
        if let Some(ref assigned_to) = self.assigned_to {
            ticket.assigned_to.clone_from(assigned_to);
        }
        if let Some(ref status_text) = self.status_text {
            ticket.status_text.clone_from(status_text);
        }
        if let Some(open) = self.open {
            ticket.open = open;
        }
    }
}
