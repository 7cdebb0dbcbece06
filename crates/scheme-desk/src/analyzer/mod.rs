//! Document checks: fuzzy name matching, expiry, file format, and the
//! pipeline that combines them.

pub mod domain;
pub mod expiry;
pub mod format;
pub mod name_match;
pub mod router;
pub mod validation;

pub use domain::{
    DocumentRecord, DocumentType, FileDescriptor, Issue, IssueKind, Severity, ValidationStatus,
};
pub use expiry::{expiry_check, ExpiryCheck, ExpiryStatus};
pub use format::{format_check, FileInfo, FormatCheck};
pub use name_match::{name_match, NameMatch};
pub use router::analyzer_router;
pub use validation::{
    validate_batch, validate_document, BatchEntry, BatchStatus, BatchValidation,
    DocumentEvidence, DocumentValidation,
};
