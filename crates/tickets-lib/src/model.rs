//! Core data types for tickets-lib.
//!
//! The serde format here is the on-disk JSONL format. The identifier is
//! stored under `id`; HTTP-facing views rename it at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const fn default_open() -> bool {
    true
}

/// A single issue record scoped to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Store-assigned identifier (24 lowercase hex chars).
    pub id: String,

    /// Partition key.
    pub project: String,

    pub issue_title: String,

    pub issue_text: String,

    /// Creation timestamp (immutable).
    pub created_on: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_on: DateTime<Utc>,

    pub created_by: String,

    #[serde(default)]
    pub assigned_to: String,

    /// `false` once the ticket is resolved.
    #[serde(default = "default_open")]
    pub open: bool,

    #[serde(default)]
    pub status_text: String,
}

impl Default for Ticket {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            project: String::new(),
            issue_title: String::new(),
            issue_text: String::new(),
            created_on: now,
            updated_on: now,
            created_by: String::new(),
            assigned_to: String::new(),
            open: true,
            status_text: String::new(),
        }
    }
}

impl Ticket {
    /// Check the persisted-ticket invariants.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = required_field_errors(
            &self.project,
            &self.issue_title,
            &self.issue_text,
            &self.created_by,
        );
        if self.updated_on < self.created_on {
            errors.push(ValidationError::new(
                "updated_on",
                "cannot be before created_on",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Fields a client supplies when creating a ticket.
///
/// The store fills in `id`, both timestamps and `open`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTicket {
    pub project: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
}

impl NewTicket {
    /// Check that every required field is present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns one `ValidationError` per blank required field.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let errors = required_field_errors(
            &self.project,
            &self.issue_title,
            &self.issue_text,
            &self.created_by,
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn required_field_errors(
    project: &str,
    issue_title: &str,
    issue_text: &str,
    created_by: &str,
) -> Vec<ValidationError> {
    [
        ("project", project),
        ("issue_title", issue_title),
        ("issue_text", issue_text),
        ("created_by", created_by),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| ValidationError::new(field, "cannot be empty"))
    .collect()
}
