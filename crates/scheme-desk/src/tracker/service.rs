use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    Application, ApplicationId, ApplicationStats, ApplicationStatus, DocumentId, DocumentUpload,
    NewApplication, Revalidation, StoredDocument, User, UserId,
};
use super::repository::{RepositoryError, TrackerStore};
use crate::analyzer::domain::{DocumentRecord, FileDescriptor};
use crate::analyzer::validation::{
    validate_batch, validate_document, BatchValidation, DocumentEvidence, DocumentValidation,
};
use crate::eligibility::{SchemeCatalog, SchemeMatch};
use crate::profile::UserProfile;
use crate::risk::{RiskModel, RiskResult};

const MAX_AGE: u32 = 120;

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("usr-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_document_id() -> DocumentId {
    let id = DOCUMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DocumentId(format!("doc-{id:06}"))
}

/// Application plus the documents attached to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    pub documents: Vec<StoredDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApplication {
    pub application: Application,
    pub risk: RiskResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub document: StoredDocument,
    pub validation: DocumentValidation,
}

/// Users, their scheme applications and uploaded documents, scored against a
/// shared catalog and risk model.
pub struct TrackerService<S> {
    store: Arc<S>,
    catalog: Arc<SchemeCatalog>,
    risk: Arc<RiskModel>,
    clock: fn() -> DateTime<Utc>,
}

impl<S> TrackerService<S>
where
    S: TrackerStore + 'static,
{
    pub fn new(store: Arc<S>, catalog: Arc<SchemeCatalog>, risk: Arc<RiskModel>) -> Self {
        Self {
            store,
            catalog,
            risk,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock, mainly so expiry-sensitive flows can be pinned.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &SchemeCatalog {
        &self.catalog
    }

    pub fn register_user(&self, profile: UserProfile) -> Result<User, TrackerError> {
        let name = profile
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            return Err(TrackerError::InvalidProfile("name is required".to_string()));
        }
        let email = profile.email.as_deref().unwrap_or_default();
        if email.is_empty() {
            return Err(TrackerError::InvalidProfile("email is required".to_string()));
        }
        validate_profile(&profile)?;

        let email = email.to_ascii_lowercase();
        if self.store.find_by_email(&email)?.is_some() {
            return Err(TrackerError::EmailTaken(email));
        }

        let now = (self.clock)();
        let user = User {
            id: next_user_id(),
            profile: UserProfile {
                name: Some(name),
                email: Some(email.clone()),
                ..profile
            },
            created_at: now,
            updated_at: now,
        };

        // The store re-checks uniqueness under its own lock.
        let stored = self.store.insert_user(user).map_err(|err| match err {
            RepositoryError::Conflict => TrackerError::EmailTaken(email),
            other => other.into(),
        })?;
        info!(user_id = %stored.id.0, "user registered");
        Ok(stored)
    }

    pub fn user(&self, user_id: &UserId) -> Result<User, TrackerError> {
        self.store
            .fetch_user(user_id)?
            .ok_or_else(|| TrackerError::UserNotFound(user_id.0.clone()))
    }

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    pub fn update_user(&self, user_id: &UserId, patch: UserProfile) -> Result<User, TrackerError> {
        let mut user = self.user(user_id)?;
        let current = user.profile.clone();

        let mut merged = UserProfile {
            name: patch.name.or(current.name),
            email: patch.email.or(current.email),
            age: patch.age.or(current.age),
            income: patch.income.or(current.income),
            state: patch.state.or(current.state),
            district: patch.district.or(current.district),
            gender: patch.gender.or(current.gender),
            category: patch.category.or(current.category),
        };

        merged.name = merged.name.map(|name| name.trim().to_string());
        if merged.name.as_deref().unwrap_or_default().is_empty() {
            return Err(TrackerError::InvalidProfile("name is required".to_string()));
        }
        validate_profile(&merged)?;

        merged.email = merged.email.map(|email| email.to_ascii_lowercase());
        if merged.email != user.profile.email {
            if let Some(email) = merged.email.as_deref() {
                if let Some(other) = self.store.find_by_email(email)? {
                    if other.id != user.id {
                        return Err(TrackerError::EmailTaken(email.to_string()));
                    }
                }
            }
        }

        user.profile = merged;
        user.updated_at = (self.clock)();
        self.store.update_user(user.clone()).map_err(|err| match err {
            RepositoryError::Conflict => {
                TrackerError::EmailTaken(user.profile.email.clone().unwrap_or_default())
            }
            other => other.into(),
        })?;
        debug!(user_id = %user.id.0, "profile updated");
        Ok(user)
    }

    pub fn eligible_schemes(&self, user_id: &UserId) -> Result<Vec<SchemeMatch>, TrackerError> {
        let user = self.user(user_id)?;
        Ok(self.catalog.eligible(&user.profile))
    }

    /// Open an application, scoring it before any documents exist.
    pub fn create_application(
        &self,
        user_id: &UserId,
        request: NewApplication,
    ) -> Result<CreatedApplication, TrackerError> {
        let user = self.user(user_id)?;
        let scheme = self
            .catalog
            .get(&request.scheme_id)
            .ok_or_else(|| TrackerError::SchemeNotFound(request.scheme_id.clone()))?;

        let already_open = self
            .store
            .applications_for(user_id)?
            .into_iter()
            .any(|existing| {
                existing.scheme_id == scheme.id && existing.status != ApplicationStatus::Rejected
            });
        if already_open {
            return Err(TrackerError::DuplicateApplication(scheme.id.clone()));
        }

        let now = (self.clock)();
        let risk = self.risk.score(&user.profile, &[], now);
        let application = Application {
            id: next_application_id(),
            user_id: user.id.clone(),
            scheme_id: scheme.id.clone(),
            scheme_name: scheme.name.clone(),
            status: ApplicationStatus::Submitted,
            risk_score: risk.overall_risk,
            risk_level: risk.risk_level,
            applied_date: now,
            updated_at: now,
        };

        let application = self
            .store
            .insert_application(application)
            .map_err(|err| match err {
                RepositoryError::Conflict => TrackerError::DuplicateApplication(scheme.id.clone()),
                other => other.into(),
            })?;
        info!(
            application_id = %application.id.0,
            scheme_id = %application.scheme_id,
            risk = application.risk_score,
            "application created"
        );
        Ok(CreatedApplication { application, risk })
    }

    /// Newest first.
    pub fn applications(&self, user_id: &UserId) -> Result<Vec<Application>, TrackerError> {
        self.user(user_id)?;
        let mut applications = self.store.applications_for(user_id)?;
        applications.sort_by(|a, b| {
            b.applied_date
                .cmp(&a.applied_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(applications)
    }

    pub fn application(
        &self,
        user_id: &UserId,
        application_id: &ApplicationId,
    ) -> Result<ApplicationDetail, TrackerError> {
        let application = self.owned_application(user_id, application_id)?;
        let documents = self.store.documents_for(application_id)?;
        Ok(ApplicationDetail {
            application,
            documents,
        })
    }

    pub fn update_status(
        &self,
        user_id: &UserId,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, TrackerError> {
        let mut application = self.owned_application(user_id, application_id)?;
        application.status = status;
        application.updated_at = (self.clock)();
        self.store.update_application(application.clone())?;
        info!(
            application_id = %application.id.0,
            status = status.label(),
            "application status updated"
        );
        Ok(application)
    }

    pub fn stats(&self, user_id: &UserId) -> Result<ApplicationStats, TrackerError> {
        self.user(user_id)?;
        let applications = self.store.applications_for(user_id)?;
        Ok(ApplicationStats::tally(&applications))
    }

    /// Rescore against the stored documents and persist the new score.
    pub fn recalculate_risk(
        &self,
        user_id: &UserId,
        application_id: &ApplicationId,
    ) -> Result<RiskResult, TrackerError> {
        let mut application = self.owned_application(user_id, application_id)?;
        let user = self.user(user_id)?;
        let records: Vec<DocumentRecord> = self
            .store
            .documents_for(application_id)?
            .iter()
            .map(StoredDocument::record)
            .collect();

        let now = (self.clock)();
        let risk = self.risk.score(&user.profile, &records, now);

        application.risk_score = risk.overall_risk;
        application.risk_level = risk.risk_level;
        application.updated_at = now;
        self.store.update_application(application)?;

        info!(
            application_id = %application_id.0,
            documents = records.len(),
            risk = risk.overall_risk,
            "risk recalculated"
        );
        Ok(risk)
    }

    pub fn documents(
        &self,
        user_id: &UserId,
        application_id: &ApplicationId,
    ) -> Result<Vec<StoredDocument>, TrackerError> {
        self.owned_application(user_id, application_id)?;
        Ok(self.store.documents_for(application_id)?)
    }

    /// Validate upload metadata and store the document with its outcome.
    pub fn upload_document(
        &self,
        user_id: &UserId,
        upload: DocumentUpload,
    ) -> Result<UploadOutcome, TrackerError> {
        let user = self.user(user_id)?;
        self.owned_application(user_id, &upload.application_id)?;
        let content_type = accepted_content_type(&upload.file)?;

        let evidence = DocumentEvidence {
            doc_type: upload.doc_type,
            file: Some(upload.file.clone()),
            expiry_date: upload.expiry_date,
            extracted_name: upload.extracted_name.clone(),
        };
        let now = (self.clock)();
        let validation = validate_document(&evidence, user.profile.display_name(), now.date_naive());

        let document = StoredDocument {
            id: next_document_id(),
            user_id: user.id.clone(),
            application_id: upload.application_id,
            doc_type: upload.doc_type,
            file: upload.file,
            content_type,
            expiry_date: upload.expiry_date,
            extracted_name: upload.extracted_name,
            validation_status: validation.validation_status,
            validation_errors: validation.validation_errors.clone(),
            warnings: validation.warnings.clone(),
            uploaded_at: now,
        };
        let document = self.store.insert_document(document)?;

        if validation.is_valid {
            info!(document_id = %document.id.0, status = ?validation.validation_status, "document stored");
        } else {
            warn!(
                document_id = %document.id.0,
                errors = validation.validation_errors.len(),
                "document stored with validation errors"
            );
        }
        Ok(UploadOutcome {
            document,
            validation,
        })
    }

    /// Re-run validation, optionally with a freshly extracted name.
    pub fn revalidate_document(
        &self,
        user_id: &UserId,
        document_id: &DocumentId,
        request: Revalidation,
    ) -> Result<DocumentValidation, TrackerError> {
        let user = self.user(user_id)?;
        let mut document = self.owned_document(user_id, document_id)?;
        if request.extracted_name.is_some() {
            document.extracted_name = request.extracted_name;
        }

        let today = (self.clock)().date_naive();
        let validation = validate_document(&document.evidence(), user.profile.display_name(), today);

        document.validation_status = validation.validation_status;
        document.validation_errors = validation.validation_errors.clone();
        document.warnings = validation.warnings.clone();
        self.store.update_document(document)?;

        debug!(document_id = %document_id.0, status = ?validation.validation_status, "document revalidated");
        Ok(validation)
    }

    /// Revalidate every document on an application in one pass.
    pub fn validate_application_documents(
        &self,
        user_id: &UserId,
        application_id: &ApplicationId,
    ) -> Result<BatchValidation, TrackerError> {
        let user = self.user(user_id)?;
        self.owned_application(user_id, application_id)?;
        let documents = self.store.documents_for(application_id)?;
        let evidence: Vec<(String, DocumentEvidence)> = documents
            .iter()
            .map(|doc| (doc.id.0.clone(), doc.evidence()))
            .collect();

        let today = (self.clock)().date_naive();
        let batch = validate_batch(
            evidence.iter().map(|(id, evidence)| (id.as_str(), evidence)),
            user.profile.display_name(),
            today,
        );

        for (mut document, entry) in documents.into_iter().zip(&batch.results) {
            document.validation_status = entry.validation.validation_status;
            document.validation_errors = entry.validation.validation_errors.clone();
            document.warnings = entry.validation.warnings.clone();
            self.store.update_document(document)?;
        }

        info!(
            application_id = %application_id.0,
            total = batch.total_documents,
            valid = batch.valid_documents,
            "application documents validated"
        );
        Ok(batch)
    }

    pub fn delete_document(
        &self,
        user_id: &UserId,
        document_id: &DocumentId,
    ) -> Result<(), TrackerError> {
        self.owned_document(user_id, document_id)?;
        self.store.delete_document(document_id)?;
        info!(document_id = %document_id.0, "document deleted");
        Ok(())
    }

    fn owned_application(
        &self,
        user_id: &UserId,
        application_id: &ApplicationId,
    ) -> Result<Application, TrackerError> {
        let application = self
            .store
            .fetch_application(application_id)?
            .ok_or_else(|| TrackerError::ApplicationNotFound(application_id.0.clone()))?;
        if &application.user_id != user_id {
            return Err(TrackerError::Forbidden(application_id.0.clone()));
        }
        Ok(application)
    }

    fn owned_document(
        &self,
        user_id: &UserId,
        document_id: &DocumentId,
    ) -> Result<StoredDocument, TrackerError> {
        let document = self
            .store
            .fetch_document(document_id)?
            .ok_or_else(|| TrackerError::DocumentNotFound(document_id.0.clone()))?;
        if &document.user_id != user_id {
            return Err(TrackerError::Forbidden(document_id.0.clone()));
        }
        Ok(document)
    }
}

fn validate_profile(profile: &UserProfile) -> Result<(), TrackerError> {
    if let Some(email) = profile.email.as_deref() {
        if !looks_like_email(email) {
            return Err(TrackerError::InvalidProfile(format!(
                "email '{email}' is not a valid address"
            )));
        }
    }
    if profile.age.is_some_and(|age| age > MAX_AGE) {
        return Err(TrackerError::InvalidProfile(format!(
            "age must be between 0 and {MAX_AGE}"
        )));
    }
    if profile
        .income
        .is_some_and(|income| !income.is_finite() || income < 0.0)
    {
        return Err(TrackerError::InvalidProfile(
            "income must be a non-negative amount".to_string(),
        ));
    }
    Ok(())
}

fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !raw.chars().any(char::is_whitespace)
}

/// Only PDF, JPEG and PNG uploads are stored, judged by the file name.
fn accepted_content_type(file: &FileDescriptor) -> Result<String, TrackerError> {
    let name = file.file_name();
    let guessed = mime_guess::from_path(name).first();
    match guessed {
        Some(mime)
            if mime == mime::APPLICATION_PDF
                || mime == mime::IMAGE_JPEG
                || mime == mime::IMAGE_PNG =>
        {
            Ok(mime.essence_str().to_string())
        }
        other => Err(TrackerError::UnsupportedContent {
            file_name: name.to_string(),
            content_type: other.map_or_else(|| "unknown".to_string(), |mime| mime.to_string()),
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("user {0} not found")]
    UserNotFound(String),
    #[error("scheme {0} not found")]
    SchemeNotFound(String),
    #[error("application {0} not found")]
    ApplicationNotFound(String),
    #[error("document {0} not found")]
    DocumentNotFound(String),
    #[error("not authorized to access {0}")]
    Forbidden(String),
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    #[error("email {0} is already registered")]
    EmailTaken(String),
    #[error("an open application for scheme {0} already exists")]
    DuplicateApplication(String),
    #[error("only .pdf, .jpg, .jpeg and .png files are allowed ({file_name} is {content_type})")]
    UnsupportedContent {
        file_name: String,
        content_type: String,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
