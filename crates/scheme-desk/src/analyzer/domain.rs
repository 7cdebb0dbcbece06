use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Document kinds accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Aadhaar,
    Pan,
    IncomeCertificate,
    AddressProof,
    BankStatement,
    CasteCertificate,
    AgeProof,
    Passport,
    DrivingLicense,
    VoterId,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "aadhaar",
            DocumentType::Pan => "pan",
            DocumentType::IncomeCertificate => "income_certificate",
            DocumentType::AddressProof => "address_proof",
            DocumentType::BankStatement => "bank_statement",
            DocumentType::CasteCertificate => "caste_certificate",
            DocumentType::AgeProof => "age_proof",
            DocumentType::Passport => "passport",
            DocumentType::DrivingLicense => "driving_license",
            DocumentType::VoterId => "voter_id",
        }
    }

    /// The five kinds most applications are expected to carry.
    pub const fn is_standard(self) -> bool {
        matches!(
            self,
            DocumentType::Aadhaar
                | DocumentType::Pan
                | DocumentType::IncomeCertificate
                | DocumentType::AddressProof
                | DocumentType::BankStatement
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Valid,
    Invalid,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingFile,
    InvalidFormat,
    FileTooLarge,
    FileTooSmall,
    FileSizeUnknown,
    LongFilename,
    SpecialCharacters,
    NameMismatch,
    NamePartialMatch,
    ExpiredDocument,
    ExpiringSoon,
    UnknownDocumentType,
}

/// A single finding raised by one of the document checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
}

impl Issue {
    pub fn new(kind: IssueKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity,
            match_score: None,
        }
    }
}

/// Descriptor of an uploaded file. `original_name` takes precedence over
/// `name` when both are present, mirroring multipart metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileDescriptor {
    #[serde(alias = "originalname", skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileDescriptor {
    pub fn named(name: impl Into<String>, size: u64) -> Self {
        Self {
            original_name: None,
            name: Some(name.into()),
            size: Some(size),
        }
    }

    pub fn file_name(&self) -> &str {
        [self.original_name.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or_default()
    }
}

/// Stored document facts consumed by the risk calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub validation_status: ValidationStatus,
}
