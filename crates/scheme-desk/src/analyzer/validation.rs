use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{DocumentType, FileDescriptor, Issue, IssueKind, Severity, ValidationStatus};
use super::expiry::expiry_check;
use super::format::format_check;
use super::name_match::name_match;

/// Similarity below this (but above the match threshold) earns a warning.
pub const EXACT_NAME_SIMILARITY: u8 = 90;

/// Everything known about a document at validation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEvidence {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub file: Option<FileDescriptor>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub extracted_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentValidation {
    pub validation_status: ValidationStatus,
    pub validation_errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub is_valid: bool,
    pub summary: String,
}

/// Run format, name, expiry and type checks over a single document.
pub fn validate_document(
    evidence: &DocumentEvidence,
    profile_name: &str,
    today: NaiveDate,
) -> DocumentValidation {
    let format = format_check(evidence.file.as_ref());
    let mut errors = format.errors;
    let mut warnings = format.warnings;

    if let Some(extracted) = evidence
        .extracted_name
        .as_deref()
        .filter(|name| !name.is_empty())
    {
        let matched = name_match(profile_name, extracted);
        if !matched.is_match {
            let mut issue = Issue::new(
                IssueKind::NameMismatch,
                Severity::High,
                format!(
                    "Name on document \"{extracted}\" doesn't match profile name \"{profile_name}\""
                ),
            );
            issue.match_score = Some(matched.similarity);
            errors.push(issue);
        } else if matched.similarity < EXACT_NAME_SIMILARITY {
            warnings.push(Issue::new(
                IssueKind::NamePartialMatch,
                Severity::Medium,
                format!(
                    "Name similarity is {}%. Please verify the name matches exactly.",
                    matched.similarity
                ),
            ));
        }
    }

    if let Some(expiry) = evidence.expiry_date {
        let check = expiry_check(Some(expiry), today);
        if check.is_expired {
            errors.push(Issue::new(
                IssueKind::ExpiredDocument,
                Severity::Critical,
                format!("Document expired on {expiry}"),
            ));
        } else if check.expiring_soon {
            warnings.push(Issue::new(
                IssueKind::ExpiringSoon,
                Severity::Medium,
                format!(
                    "Document expires in {} days",
                    check.days_until_expiry.unwrap_or_default()
                ),
            ));
        }
    }

    if !evidence.doc_type.is_standard() {
        warnings.push(Issue::new(
            IssueKind::UnknownDocumentType,
            Severity::Low,
            format!(
                "Document type \"{}\" is not in the standard list",
                evidence.doc_type.label()
            ),
        ));
    }

    let validation_status = if !errors.is_empty() {
        ValidationStatus::Invalid
    } else if !warnings.is_empty() {
        ValidationStatus::Warning
    } else {
        ValidationStatus::Valid
    };

    DocumentValidation {
        summary: summarize(validation_status, &errors, &warnings),
        is_valid: errors.is_empty(),
        validation_status,
        validation_errors: errors,
        warnings,
    }
}

fn summarize(status: ValidationStatus, errors: &[Issue], warnings: &[Issue]) -> String {
    match status {
        ValidationStatus::Valid => "Document validated successfully".to_string(),
        ValidationStatus::Invalid => format!(
            "{} validation error(s) found. Please fix and re-upload.",
            errors.len()
        ),
        ValidationStatus::Warning => format!(
            "{} warning(s) found. Review recommended.",
            warnings.len()
        ),
        ValidationStatus::Pending => "Document validation completed".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    AllValid,
    CriticalIssues,
    MinorIssues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub document_id: String,
    pub document_type: DocumentType,
    #[serde(flatten)]
    pub validation: DocumentValidation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchValidation {
    pub results: Vec<BatchEntry>,
    pub all_valid: bool,
    pub total_documents: usize,
    pub valid_documents: usize,
    pub critical_issues: usize,
    pub overall_status: BatchStatus,
}

/// Validate several documents for the same applicant and summarise them.
pub fn validate_batch<'a, I>(documents: I, profile_name: &str, today: NaiveDate) -> BatchValidation
where
    I: IntoIterator<Item = (&'a str, &'a DocumentEvidence)>,
{
    let results: Vec<BatchEntry> = documents
        .into_iter()
        .map(|(id, evidence)| BatchEntry {
            document_id: id.to_string(),
            document_type: evidence.doc_type,
            validation: validate_document(evidence, profile_name, today),
        })
        .collect();

    let valid_documents = results
        .iter()
        .filter(|entry| entry.validation.is_valid)
        .count();
    let critical_issues = results
        .iter()
        .filter(|entry| {
            entry
                .validation
                .validation_errors
                .iter()
                .any(|issue| issue.severity == Severity::Critical)
        })
        .count();
    let all_valid = valid_documents == results.len();

    let overall_status = if all_valid {
        BatchStatus::AllValid
    } else if critical_issues > 0 {
        BatchStatus::CriticalIssues
    } else {
        BatchStatus::MinorIssues
    };

    BatchValidation {
        total_documents: results.len(),
        results,
        all_valid,
        valid_documents,
        critical_issues,
        overall_status,
    }
}
