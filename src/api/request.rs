//! Request bodies for the issue API.
//!
//! Clients send either form-encoded or JSON bodies, and JSON clients may
//! send any value type for any field. Fields are kept loosely typed here
//! and interpreted with truthiness rules: absent, `null`, `""`, `false`
//! and `0` all count as "not supplied".

use axum::http::{HeaderMap, header};
use serde::Deserialize;
use serde_json::{Map, Value};
use tickets_lib::error::ValidationError;
use tickets_lib::{NewTicket, TicketPatch};
use tracing::debug;

/// A single loosely typed field value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Other(Value),
}

impl FieldValue {
    /// Whether the value counts as supplied.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Self::Text(s) => !s.is_empty(),
            Self::Other(value) => !value.is_null(),
        }
    }

    /// The value rendered as a string.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Other(value) => value.to_string(),
        }
    }

    /// The value cast to a boolean.
    ///
    /// `true`, `1` and `yes` are true; `false`, `0` and `no` are false.
    /// Anything else does not cast.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => match n.as_u64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Self::Text(s) => match s.as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            Self::Other(_) => None,
        }
    }
}

/// Supplied text for a field, or `None` if it is falsy.
pub(crate) fn supplied_text(value: Option<&FieldValue>) -> Option<String> {
    value.filter(|v| v.is_truthy()).map(FieldValue::as_text)
}

/// Body of a create, update or delete request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TicketRequest {
    #[serde(rename = "_id")]
    pub id: Option<FieldValue>,
    pub issue_title: Option<FieldValue>,
    pub issue_text: Option<FieldValue>,
    pub created_by: Option<FieldValue>,
    pub assigned_to: Option<FieldValue>,
    pub status_text: Option<FieldValue>,
    pub open: Option<FieldValue>,
}

/// Fold form pairs into a JSON object. A repeated key keeps its last value.
fn form_object(pairs: Vec<(String, String)>) -> Value {
    let object: Map<String, Value> = pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    Value::Object(object)
}

impl TicketRequest {
    /// Parse a request body according to its content type.
    ///
    /// JSON bodies are parsed as JSON; everything else as form data. A body
    /// that fails to parse is treated as empty.
    #[must_use]
    pub fn from_body(headers: &HeaderMap, body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }

        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| {
                let mime = value.split(';').next().unwrap_or_default().trim();
                mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
            });

        // Both codecs go through `Value` so repeated keys resolve to the last
        // occurrence instead of failing the whole body.
        let value = if is_json {
            serde_json::from_slice::<Value>(body).map_err(|e| e.to_string())
        } else {
            serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
                .map(form_object)
                .map_err(|e| e.to_string())
        };

        value
            .and_then(|value| match value {
                Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
                other => Err(format!("expected an object, got {other}")),
            })
            .unwrap_or_else(|reason| {
                debug!(json = is_json, %reason, "Unparseable request body; treating as empty");
                Self::default()
            })
    }

    /// The target ticket ID, if supplied.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        supplied_text(self.id.as_ref())
    }

    /// Build a new ticket for `project` from the supplied fields.
    ///
    /// Missing fields become empty strings; validation happens separately.
    #[must_use]
    pub fn to_new_ticket(&self, project: &str) -> NewTicket {
        NewTicket {
            project: project.to_string(),
            issue_title: supplied_text(self.issue_title.as_ref()).unwrap_or_default(),
            issue_text: supplied_text(self.issue_text.as_ref()).unwrap_or_default(),
            created_by: supplied_text(self.created_by.as_ref()).unwrap_or_default(),
            assigned_to: supplied_text(self.assigned_to.as_ref()).unwrap_or_default(),
            status_text: supplied_text(self.status_text.as_ref()).unwrap_or_default(),
        }
    }

    /// Whether any update field carries a truthy value.
    #[must_use]
    pub fn has_update_fields(&self) -> bool {
        [
            &self.issue_title,
            &self.issue_text,
            &self.created_by,
            &self.assigned_to,
            &self.status_text,
            &self.open,
        ]
        .into_iter()
        .any(|field| field.as_ref().is_some_and(FieldValue::is_truthy))
    }

    /// Build a patch from the supplied (truthy) update fields.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` on `open` if it does not cast to a boolean.
    pub fn to_patch(&self) -> Result<TicketPatch, ValidationError> {
        let open = match self.open.as_ref().filter(|v| v.is_truthy()) {
            Some(value) => Some(value.as_bool().ok_or_else(|| {
                ValidationError::new("open", format!("cannot cast {} to boolean", value.as_text()))
            })?),
            None => None,
        };

        Ok(TicketPatch {
            issue_title: supplied_text(self.issue_title.as_ref()),
            issue_text: supplied_text(self.issue_text.as_ref()),
            created_by: supplied_text(self.created_by.as_ref()),
            assigned_to: supplied_text(self.assigned_to.as_ref()),
            status_text: supplied_text(self.status_text.as_ref()),
            open,
        })
    }
}
