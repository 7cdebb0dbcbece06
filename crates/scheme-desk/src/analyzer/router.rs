use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use super::domain::{DocumentRecord, FileDescriptor};
use super::expiry::{expiry_check, ExpiryCheck};
use super::format::{format_check, FormatCheck};
use super::name_match::{name_match, NameMatch};
use super::validation::{validate_document, DocumentEvidence, DocumentValidation};
use crate::eligibility::{evaluate_eligibility, EligibilityResult, SchemeRule};
use crate::error::AppError;
use crate::profile::UserProfile;
use crate::risk::{RiskModel, RiskResult};

/// Stateless endpoints exposing each check over HTTP.
pub fn analyzer_router(risk: Arc<RiskModel>) -> Router {
    Router::new()
        .route("/api/analyzer/name-match", post(name_match_handler))
        .route("/api/analyzer/expiry", post(expiry_handler))
        .route("/api/analyzer/format", post(format_handler))
        .route("/api/analyzer/document", post(document_handler))
        .route("/api/analyzer/eligibility", post(eligibility_handler))
        .route("/api/analyzer/risk", post(risk_handler))
        .with_state(risk)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NameMatchRequest {
    user_name: String,
    document_name: String,
}

pub(crate) async fn name_match_handler(Json(request): Json<NameMatchRequest>) -> Json<NameMatch> {
    Json(name_match(&request.user_name, &request.document_name))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpiryRequest {
    #[serde(default)]
    expiry_date: Option<NaiveDate>,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn expiry_handler(Json(request): Json<ExpiryRequest>) -> Json<ExpiryCheck> {
    let today = request.today.unwrap_or_else(|| Utc::now().date_naive());
    Json(expiry_check(request.expiry_date, today))
}

#[derive(Debug, Deserialize)]
pub(crate) struct FormatRequest {
    #[serde(default)]
    file: Option<FileDescriptor>,
}

pub(crate) async fn format_handler(Json(request): Json<FormatRequest>) -> Json<FormatCheck> {
    Json(format_check(request.file.as_ref()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentRequest {
    document: DocumentEvidence,
    #[serde(default)]
    profile_name: String,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn document_handler(
    Json(request): Json<DocumentRequest>,
) -> Json<DocumentValidation> {
    let today = request.today.unwrap_or_else(|| Utc::now().date_naive());
    let validation = validate_document(&request.document, &request.profile_name, today);
    debug!(
        doc_type = request.document.doc_type.label(),
        status = ?validation.validation_status,
        "document analyzed"
    );
    Json(validation)
}

#[derive(Debug, Deserialize)]
pub(crate) struct EligibilityRequest {
    #[serde(default)]
    profile: UserProfile,
    rules: serde_json::Value,
}

/// The rule object is parsed here rather than by the extractor so an
/// unreadable shape surfaces as malformed input.
pub(crate) async fn eligibility_handler(
    Json(request): Json<EligibilityRequest>,
) -> Result<Json<EligibilityResult>, AppError> {
    let rule = SchemeRule::from_value(request.rules)?;
    Ok(Json(evaluate_eligibility(&request.profile, &rule)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RiskRequest {
    #[serde(default)]
    profile: UserProfile,
    #[serde(default)]
    documents: Vec<DocumentRecord>,
}

pub(crate) async fn risk_handler(
    State(model): State<Arc<RiskModel>>,
    Json(request): Json<RiskRequest>,
) -> Json<RiskResult> {
    Json(model.score(&request.profile, &request.documents, Utc::now()))
}
