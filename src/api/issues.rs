//! Handlers for `/api/issues/:project`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use tickets_lib::{TicketError, TicketFilter, TicketStore};
use tracing::{debug, info, warn};

use crate::api::request::TicketRequest;
use crate::api::state::AppState;
use crate::error::ApiError;
use crate::format::{MutationResult, TicketView};
use crate::validation::{CreateValidator, TargetValidator, UpdateRejection};

/// Run a store call on the blocking pool.
async fn run_store<T, F>(store: Arc<dyn TicketStore>, op: F) -> tickets_lib::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn TicketStore) -> tickets_lib::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| TicketError::Storage(format!("store task failed: {e}")))?
}

/// `GET /api/issues/:project`: list tickets, filtered by query pairs.
pub async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Json<Vec<TicketView>> {
    debug!(%project, ?params, "List issues");

    let mut filter = TicketFilter::project(project.clone());
    filter.fields = params;
    filter.fields.remove("project");

    match run_store(Arc::clone(&state.store), move |store| store.find(&filter)).await {
        Ok(tickets) => Json(tickets.into_iter().map(TicketView::from).collect()),
        Err(err) => {
            warn!(%project, error = %err, "List failed; returning empty result");
            Json(Vec::new())
        }
    }
}

/// `POST /api/issues/:project`: create a ticket.
///
/// # Errors
///
/// `RequiredFieldsMissing` if a required field is absent or blank,
/// `CouldNotCreate` if the store rejects the write.
pub async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TicketView>, ApiError> {
    let request = TicketRequest::from_body(&headers, &body);
    debug!(%project, "Create issue");

    if let Err(errors) = CreateValidator::validate(&request) {
        debug!(%project, ?errors, "Create rejected");
        return Err(ApiError::RequiredFieldsMissing);
    }

    let new = request.to_new_ticket(&project);
    match run_store(Arc::clone(&state.store), move |store| store.insert(new)).await {
        Ok(ticket) => {
            info!(%project, id = %ticket.id, "Created issue");
            Ok(Json(TicketView::from(ticket)))
        }
        Err(err @ (TicketError::Validation { .. } | TicketError::ValidationErrors { .. })) => {
            debug!(%project, error = %err, "Store rejected new issue");
            Err(ApiError::RequiredFieldsMissing)
        }
        Err(err) => {
            warn!(%project, error = %err, "Create failed");
            Err(ApiError::CouldNotCreate)
        }
    }
}

/// `PUT /api/issues/:project`: partially update a ticket.
///
/// # Errors
///
/// `MissingId`, `NoUpdateFields` or `CouldNotUpdate`, in that order of
/// precedence. An `open` value that does not cast to a boolean is
/// `CouldNotUpdate`.
pub async fn update_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MutationResult>, ApiError> {
    let request = TicketRequest::from_body(&headers, &body);
    let id = TargetValidator::validate_update(&request).map_err(|rejection| match rejection {
        UpdateRejection::MissingId => ApiError::MissingId,
        UpdateRejection::NoFields { id } => ApiError::NoUpdateFields { id },
    })?;
    debug!(%project, %id, "Update issue");

    let patch = request.to_patch().map_err(|err| {
        debug!(%project, %id, error = %err, "Update field did not cast");
        ApiError::CouldNotUpdate { id: id.clone() }
    })?;
    let filter = TicketFilter::scoped(project.clone(), id.clone());
    match run_store(Arc::clone(&state.store), move |store| {
        store.update_one(&filter, &patch)
    })
    .await
    {
        Ok(Some(_)) => {
            info!(%project, %id, "Updated issue");
            Ok(Json(MutationResult::updated(id)))
        }
        Ok(None) => {
            debug!(%project, %id, "Update matched no issue");
            Err(ApiError::CouldNotUpdate { id })
        }
        Err(err) if err.is_not_found() => {
            debug!(%project, %id, error = %err, "Update target invalid");
            Err(ApiError::CouldNotUpdate { id })
        }
        Err(err) => {
            warn!(%project, %id, error = %err, "Update failed");
            Err(ApiError::CouldNotUpdate { id })
        }
    }
}

/// `DELETE /api/issues/:project`: delete a ticket.
///
/// # Errors
///
/// `MissingId` or `CouldNotDelete`.
pub async fn delete_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MutationResult>, ApiError> {
    let request = TicketRequest::from_body(&headers, &body);
    let id = TargetValidator::validate_id(&request).map_err(|_| ApiError::MissingId)?;
    debug!(%project, %id, "Delete issue");

    let filter = TicketFilter::scoped(project.clone(), id.clone());
    match run_store(Arc::clone(&state.store), move |store| store.delete_one(&filter)).await {
        Ok(true) => {
            info!(%project, %id, "Deleted issue");
            Ok(Json(MutationResult::deleted(id)))
        }
        Ok(false) => {
            debug!(%project, %id, "Delete matched no issue");
            Err(ApiError::CouldNotDelete { id })
        }
        Err(err) if err.is_not_found() => {
            debug!(%project, %id, error = %err, "Delete target invalid");
            Err(ApiError::CouldNotDelete { id })
        }
        Err(err) => {
            warn!(%project, %id, error = %err, "Delete failed");
            Err(ApiError::CouldNotDelete { id })
        }
    }
}
