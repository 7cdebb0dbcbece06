//! Application tracker: registered users, their scheme applications and the
//! documents uploaded against them.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStats, ApplicationStatus, DocumentId, DocumentUpload,
    NewApplication, Revalidation, StatusUpdate, StoredDocument, User, UserId,
};
pub use repository::{ApplicationStore, DocumentStore, RepositoryError, TrackerStore, UserStore};
pub use router::tracker_router;
pub use service::{
    ApplicationDetail, CreatedApplication, TrackerError, TrackerService, UploadOutcome,
};
