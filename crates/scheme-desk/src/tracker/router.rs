use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{
    ApplicationId, DocumentId, DocumentUpload, NewApplication, Revalidation, StatusUpdate, UserId,
};
use super::repository::{RepositoryError, TrackerStore};
use super::service::{TrackerError, TrackerService};
use crate::eligibility::SchemeCategory;
use crate::profile::UserProfile;

/// Catalog, user, application and document endpoints.
pub fn tracker_router<S>(service: Arc<TrackerService<S>>) -> Router
where
    S: TrackerStore + 'static,
{
    Router::new()
        .route("/api/schemes", get(list_schemes_handler::<S>))
        .route("/api/schemes/:scheme_id", get(scheme_handler::<S>))
        .route(
            "/api/schemes/category/:category",
            get(schemes_by_category_handler::<S>),
        )
        .route("/api/users", post(register_handler::<S>))
        .route(
            "/api/users/:user_id",
            get(user_handler::<S>).put(update_user_handler::<S>),
        )
        .route(
            "/api/users/:user_id/schemes/eligible",
            get(eligible_schemes_handler::<S>),
        )
        .route(
            "/api/users/:user_id/applications",
            post(create_application_handler::<S>).get(list_applications_handler::<S>),
        )
        .route(
            "/api/users/:user_id/applications/stats",
            get(stats_handler::<S>),
        )
        .route(
            "/api/users/:user_id/applications/:application_id",
            get(application_handler::<S>),
        )
        .route(
            "/api/users/:user_id/applications/:application_id/status",
            put(status_handler::<S>),
        )
        .route(
            "/api/users/:user_id/applications/:application_id/risk",
            get(risk_handler::<S>),
        )
        .route(
            "/api/users/:user_id/applications/:application_id/documents",
            get(application_documents_handler::<S>),
        )
        .route(
            "/api/users/:user_id/applications/:application_id/documents/validate",
            post(validate_application_documents_handler::<S>),
        )
        .route(
            "/api/users/:user_id/documents",
            post(upload_document_handler::<S>),
        )
        .route(
            "/api/users/:user_id/documents/:document_id",
            axum::routing::delete(delete_document_handler::<S>),
        )
        .route(
            "/api/users/:user_id/documents/:document_id/validate",
            post(revalidate_document_handler::<S>),
        )
        .with_state(service)
}

fn failure(err: TrackerError) -> Response {
    let status = match &err {
        TrackerError::UserNotFound(_)
        | TrackerError::SchemeNotFound(_)
        | TrackerError::ApplicationNotFound(_)
        | TrackerError::DocumentNotFound(_)
        | TrackerError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        TrackerError::Forbidden(_) => StatusCode::FORBIDDEN,
        TrackerError::InvalidProfile(_) => StatusCode::BAD_REQUEST,
        TrackerError::UnsupportedContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TrackerError::EmailTaken(_)
        | TrackerError::DuplicateApplication(_)
        | TrackerError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        TrackerError::Repository(RepositoryError::Unavailable(_)) => {
            error!(error = %err, "tracker store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, TrackerError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => failure(err),
    }
}

fn listing<T: serde::Serialize>(result: Result<Vec<T>, TrackerError>) -> Response {
    match result {
        Ok(items) => {
            let payload = json!({
                "count": items.len(),
                "data": items,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => failure(err),
    }
}

pub(crate) async fn list_schemes_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
) -> Response
where
    S: TrackerStore + 'static,
{
    listing(Ok(service.catalog().all().to_vec()))
}

pub(crate) async fn scheme_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(scheme_id): Path<String>,
) -> Response
where
    S: TrackerStore + 'static,
{
    let result = service
        .catalog()
        .get(&scheme_id)
        .cloned()
        .ok_or(TrackerError::SchemeNotFound(scheme_id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn schemes_by_category_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(category): Path<String>,
) -> Response
where
    S: TrackerStore + 'static,
{
    match SchemeCategory::from_label(&category) {
        Some(category) => listing(Ok(service
            .catalog()
            .by_category(category)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>())),
        None => {
            let payload = json!({
                "error": format!("unknown scheme category '{category}'"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn register_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Json(profile): Json<UserProfile>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(StatusCode::CREATED, service.register_user(profile))
}

pub(crate) async fn user_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(StatusCode::OK, service.user(&UserId(user_id)))
}

pub(crate) async fn update_user_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(user_id): Path<String>,
    Json(patch): Json<UserProfile>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(StatusCode::OK, service.update_user(&UserId(user_id), patch))
}

pub(crate) async fn eligible_schemes_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: TrackerStore + 'static,
{
    listing(service.eligible_schemes(&UserId(user_id)))
}

pub(crate) async fn create_application_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(user_id): Path<String>,
    Json(request): Json<NewApplication>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(
        StatusCode::CREATED,
        service.create_application(&UserId(user_id), request),
    )
}

pub(crate) async fn list_applications_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: TrackerStore + 'static,
{
    listing(service.applications(&UserId(user_id)))
}

pub(crate) async fn stats_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(StatusCode::OK, service.stats(&UserId(user_id)))
}

pub(crate) async fn application_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path((user_id, application_id)): Path<(String, String)>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(
        StatusCode::OK,
        service.application(&UserId(user_id), &ApplicationId(application_id)),
    )
}

pub(crate) async fn status_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path((user_id, application_id)): Path<(String, String)>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(
        StatusCode::OK,
        service.update_status(
            &UserId(user_id),
            &ApplicationId(application_id),
            update.status,
        ),
    )
}

pub(crate) async fn risk_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path((user_id, application_id)): Path<(String, String)>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(
        StatusCode::OK,
        service.recalculate_risk(&UserId(user_id), &ApplicationId(application_id)),
    )
}

pub(crate) async fn application_documents_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path((user_id, application_id)): Path<(String, String)>,
) -> Response
where
    S: TrackerStore + 'static,
{
    listing(service.documents(&UserId(user_id), &ApplicationId(application_id)))
}

pub(crate) async fn validate_application_documents_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path((user_id, application_id)): Path<(String, String)>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(
        StatusCode::OK,
        service.validate_application_documents(&UserId(user_id), &ApplicationId(application_id)),
    )
}

pub(crate) async fn upload_document_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path(user_id): Path<String>,
    Json(upload): Json<DocumentUpload>,
) -> Response
where
    S: TrackerStore + 'static,
{
    respond(
        StatusCode::CREATED,
        service.upload_document(&UserId(user_id), upload),
    )
}

pub(crate) async fn revalidate_document_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path((user_id, document_id)): Path<(String, String)>,
    request: Option<Json<Revalidation>>,
) -> Response
where
    S: TrackerStore + 'static,
{
    let request = request.map(|Json(body)| body).unwrap_or_default();
    respond(
        StatusCode::OK,
        service.revalidate_document(&UserId(user_id), &DocumentId(document_id), request),
    )
}

pub(crate) async fn delete_document_handler<S>(
    State(service): State<Arc<TrackerService<S>>>,
    Path((user_id, document_id)): Path<(String, String)>,
) -> Response
where
    S: TrackerStore + 'static,
{
    match service.delete_document(&UserId(user_id), &DocumentId(document_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure(err),
    }
}
