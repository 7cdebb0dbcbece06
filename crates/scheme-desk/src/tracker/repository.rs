use super::domain::{Application, ApplicationId, DocumentId, StoredDocument, User, UserId};

/// Storage abstraction for registered users.
pub trait UserStore: Send + Sync {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError>;
    fn update_user(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

pub trait ApplicationStore: Send + Sync {
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn update_application(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    /// Applications owned by `user`, in any order.
    fn applications_for(&self, user: &UserId) -> Result<Vec<Application>, RepositoryError>;
}

pub trait DocumentStore: Send + Sync {
    fn insert_document(&self, document: StoredDocument) -> Result<StoredDocument, RepositoryError>;
    fn update_document(&self, document: StoredDocument) -> Result<(), RepositoryError>;
    fn fetch_document(&self, id: &DocumentId) -> Result<Option<StoredDocument>, RepositoryError>;
    /// Documents attached to `application`, in upload order.
    fn documents_for(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<StoredDocument>, RepositoryError>;
    fn delete_document(&self, id: &DocumentId) -> Result<(), RepositoryError>;
}

/// Everything the tracker service persists.
pub trait TrackerStore: UserStore + ApplicationStore + DocumentStore {}

impl<T> TrackerStore for T where T: UserStore + ApplicationStore + DocumentStore {}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
