//! Validation helpers for issue API requests.
//!
//! These routines check request bodies before anything touches the store
//! and return structured validation errors without side effects.

use tickets_lib::error::ValidationError;

use crate::api::request::{TicketRequest, supplied_text};

/// Validates create requests.
pub struct CreateValidator;

impl CreateValidator {
    /// Check that `issue_title`, `issue_text` and `created_by` are present
    /// and non-blank.
    ///
    /// # Errors
    ///
    /// Returns one `ValidationError` per missing field.
    pub fn validate(request: &TicketRequest) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = [
            ("issue_title", &request.issue_title),
            ("issue_text", &request.issue_text),
            ("created_by", &request.created_by),
        ]
        .into_iter()
        .filter(|&(_, value)| {
            supplied_text(value.as_ref()).is_none_or(|text| text.trim().is_empty())
        })
        .map(|(field, _)| ValidationError::new(field, "required"))
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Why an update request cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRejection {
    MissingId,
    NoFields { id: String },
}

/// Validates update and delete requests.
pub struct TargetValidator;

impl TargetValidator {
    /// Resolve the target ticket ID.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` on `_id` if it is missing or blank.
    pub fn validate_id(request: &TicketRequest) -> Result<String, ValidationError> {
        request
            .id()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ValidationError::new("_id", "missing"))
    }

    /// Resolve the target ID and require at least one update field.
    ///
    /// # Errors
    ///
    /// Returns `MissingId` first, then `NoFields` if nothing would change.
    pub fn validate_update(request: &TicketRequest) -> Result<String, UpdateRejection> {
        let id = Self::validate_id(request).map_err(|_| UpdateRejection::MissingId)?;
        if !request.has_update_fields() {
            return Err(UpdateRejection::NoFields { id });
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::FieldValue;

    fn text(value: &str) -> Option<FieldValue> {
        Some(FieldValue::Text(value.to_string()))
    }

    #[test]
    fn create_validation_accepts_required_fields() {
        let request = TicketRequest {
            issue_title: text("Title"),
            issue_text: text("Text"),
            created_by: text("me"),
            ..Default::default()
        };
        assert!(CreateValidator::validate(&request).is_ok());
    }

    #[test]
    fn create_validation_reports_each_missing_field() {
        let request = TicketRequest {
            issue_title: text("Title"),
            issue_text: text("   "),
            ..Default::default()
        };
        let errors = CreateValidator::validate(&request).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["issue_text", "created_by"]);
    }

    #[test]
    fn update_validation_requires_id_first() {
        let request = TicketRequest {
            issue_title: text("New"),
            ..Default::default()
        };
        assert_eq!(
            TargetValidator::validate_update(&request),
            Err(UpdateRejection::MissingId)
        );
    }

    #[test]
    fn update_validation_rejects_blank_id() {
        let request = TicketRequest {
            id: text("  "),
            issue_title: text("New"),
            ..Default::default()
        };
        assert_eq!(
            TargetValidator::validate_update(&request),
            Err(UpdateRejection::MissingId)
        );
    }

    #[test]
    fn update_validation_requires_a_field() {
        let request = TicketRequest {
            id: text("abc"),
            status_text: text(""),
            ..Default::default()
        };
        assert_eq!(
            TargetValidator::validate_update(&request),
            Err(UpdateRejection::NoFields { id: "abc".into() })
        );
    }

    #[test]
    fn create_validation_treats_falsy_json_values_as_missing() {
        let request = TicketRequest {
            issue_title: Some(FieldValue::Bool(false)),
            issue_text: Some(FieldValue::Number(0.into())),
            created_by: text("me"),
            ..Default::default()
        };
        let errors = CreateValidator::validate(&request).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["issue_title", "issue_text"]);
    }

    #[test]
    fn update_validation_counts_uncastable_open_as_a_field() {
        let request = TicketRequest {
            id: text("abc"),
            open: text("maybe"),
            ..Default::default()
        };
        assert_eq!(TargetValidator::validate_update(&request), Ok("abc".into()));
    }

    #[test]
    fn update_validation_passes_with_field() {
        let request = TicketRequest {
            id: text("abc"),
            open: Some(FieldValue::Text("false".into())),
            ..Default::default()
        };
        assert_eq!(TargetValidator::validate_update(&request), Ok("abc".into()));
    }
}
