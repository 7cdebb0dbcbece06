use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::domain::{DocumentRecord, DocumentType, FileDescriptor, Issue, ValidationStatus};
use crate::analyzer::validation::DocumentEvidence;
use crate::profile::UserProfile;
use crate::risk::RiskLevel;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Registered applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// A user's application to one scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub scheme_id: String,
    pub scheme_name: String,
    pub status: ApplicationStatus,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub applied_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub scheme_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total: usize,
    pub submitted: usize,
    pub under_review: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ApplicationStats {
    pub fn tally<'a>(applications: impl IntoIterator<Item = &'a Application>) -> Self {
        applications
            .into_iter()
            .fold(Self::default(), |mut stats, application| {
                stats.total += 1;
                match application.status {
                    ApplicationStatus::Submitted => stats.submitted += 1,
                    ApplicationStatus::UnderReview => stats.under_review += 1,
                    ApplicationStatus::Approved => stats.approved += 1,
                    ApplicationStatus::Rejected => stats.rejected += 1,
                }
                stats
            })
    }
}

/// Upload metadata. The file bytes themselves are never handled here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    pub application_id: ApplicationId,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub file: FileDescriptor,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub extracted_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revalidation {
    #[serde(default)]
    pub extracted_name: Option<String>,
}

/// A stored document together with its latest validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: DocumentId,
    pub user_id: UserId,
    pub application_id: ApplicationId,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub file: FileDescriptor,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_name: Option<String>,
    pub validation_status: ValidationStatus,
    pub validation_errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn record(&self) -> DocumentRecord {
        DocumentRecord {
            doc_type: self.doc_type,
            expiry_date: self.expiry_date,
            validation_status: self.validation_status,
        }
    }

    pub fn evidence(&self) -> DocumentEvidence {
        DocumentEvidence {
            doc_type: self.doc_type,
            file: Some(self.file.clone()),
            expiry_date: self.expiry_date,
            extracted_name: self.extracted_name.clone(),
        }
    }
}
