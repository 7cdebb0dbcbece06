use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::analyzer::domain::{DocumentType, FileDescriptor};
use crate::eligibility::SchemeCatalog;
use crate::profile::UserProfile;
use crate::risk::RiskModel;
use crate::tracker::domain::{
    Application, ApplicationId, ApplicationStatus, DocumentId, DocumentUpload, StoredDocument,
    User, UserId,
};
use crate::tracker::repository::{ApplicationStore, DocumentStore, RepositoryError, UserStore};
use crate::tracker::{tracker_router, TrackerService};

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn profile(name: &str, email: &str) -> UserProfile {
    UserProfile {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        age: Some(34),
        income: Some(180_000.0),
        state: Some("Maharashtra".to_string()),
        district: Some("Nashik".to_string()),
        ..UserProfile::default()
    }
}

pub(super) fn upload(application_id: &ApplicationId, doc_type: DocumentType, file: &str) -> DocumentUpload {
    DocumentUpload {
        application_id: application_id.clone(),
        doc_type,
        file: FileDescriptor::named(file, 180 * 1024),
        expiry_date: None,
        extracted_name: None,
    }
}

pub(super) fn build_service() -> (TrackerService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let catalog = Arc::new(SchemeCatalog::embedded().expect("embedded catalog"));
    let service = TrackerService::new(store.clone(), catalog, Arc::new(RiskModel::weighted()))
        .with_clock(fixed_now);
    (service, store)
}

pub(super) fn router_with_service(service: Arc<TrackerService<MemoryStore>>) -> axum::Router {
    tracker_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default)]
pub(super) struct MemoryStore {
    users: Mutex<HashMap<UserId, User>>,
    applications: Mutex<HashMap<ApplicationId, Application>>,
    documents: Mutex<Vec<StoredDocument>>,
    stale_lookups: AtomicBool,
}

impl MemoryStore {
    /// Make email and application lookups miss, as a concurrent request
    /// racing past the service's pre-checks would see them.
    pub(super) fn serve_stale_lookups(&self) {
        self.stale_lookups.store(true, Ordering::SeqCst);
    }

    fn stale(&self) -> bool {
        self.stale_lookups.load(Ordering::SeqCst)
    }
}

fn email_in_use(users: &HashMap<UserId, User>, user: &User) -> bool {
    let Some(email) = user.profile.email.as_deref() else {
        return false;
    };
    users
        .values()
        .any(|other| other.id != user.id && other.profile.email.as_deref() == Some(email))
}

impl UserStore for MemoryStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = self.users.lock().expect("users mutex poisoned");
        if guard.contains_key(&user.id) || email_in_use(&guard, &user) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = self.users.lock().expect("users mutex poisoned");
        if email_in_use(&guard, &user) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id.clone(), user);
        Ok(())
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let guard = self.users.lock().expect("users mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        if self.stale() {
            return Ok(None);
        }
        let guard = self.users.lock().expect("users mutex poisoned");
        Ok(guard
            .values()
            .find(|user| user.profile.email.as_deref() == Some(email))
            .cloned())
    }
}

impl ApplicationStore for MemoryStore {
    fn insert_application(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.applications.lock().expect("applications mutex poisoned");
        let open_for_scheme = guard.values().any(|existing| {
            existing.user_id == application.user_id
                && existing.scheme_id == application.scheme_id
                && existing.status != ApplicationStatus::Rejected
        });
        if open_for_scheme {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.applications.lock().expect("applications mutex poisoned");
        guard.insert(application.id.clone(), application);
        Ok(())
    }

    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.applications.lock().expect("applications mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn applications_for(&self, user: &UserId) -> Result<Vec<Application>, RepositoryError> {
        if self.stale() {
            return Ok(Vec::new());
        }
        let guard = self.applications.lock().expect("applications mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| &application.user_id == user)
            .cloned()
            .collect())
    }
}

impl DocumentStore for MemoryStore {
    fn insert_document(&self, document: StoredDocument) -> Result<StoredDocument, RepositoryError> {
        let mut guard = self.documents.lock().expect("documents mutex poisoned");
        guard.push(document.clone());
        Ok(document)
    }

    fn update_document(&self, document: StoredDocument) -> Result<(), RepositoryError> {
        let mut guard = self.documents.lock().expect("documents mutex poisoned");
        match guard.iter_mut().find(|stored| stored.id == document.id) {
            Some(stored) => {
                *stored = document;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_document(&self, id: &DocumentId) -> Result<Option<StoredDocument>, RepositoryError> {
        let guard = self.documents.lock().expect("documents mutex poisoned");
        Ok(guard.iter().find(|stored| &stored.id == id).cloned())
    }

    fn documents_for(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<StoredDocument>, RepositoryError> {
        let guard = self.documents.lock().expect("documents mutex poisoned");
        Ok(guard
            .iter()
            .filter(|stored| &stored.application_id == application)
            .cloned()
            .collect())
    }

    fn delete_document(&self, id: &DocumentId) -> Result<(), RepositoryError> {
        let mut guard = self.documents.lock().expect("documents mutex poisoned");
        let before = guard.len();
        guard.retain(|stored| &stored.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Store whose every call fails, for exercising 500 paths.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("connection refused".to_string()))
}

impl UserStore for UnavailableStore {
    fn insert_user(&self, _user: User) -> Result<User, RepositoryError> {
        offline()
    }

    fn update_user(&self, _user: User) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_user(&self, _id: &UserId) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepositoryError> {
        offline()
    }
}

impl ApplicationStore for UnavailableStore {
    fn insert_application(&self, _application: Application) -> Result<Application, RepositoryError> {
        offline()
    }

    fn update_application(&self, _application: Application) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_application(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn applications_for(&self, _user: &UserId) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }
}

impl DocumentStore for UnavailableStore {
    fn insert_document(&self, _document: StoredDocument) -> Result<StoredDocument, RepositoryError> {
        offline()
    }

    fn update_document(&self, _document: StoredDocument) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_document(&self, _id: &DocumentId) -> Result<Option<StoredDocument>, RepositoryError> {
        offline()
    }

    fn documents_for(
        &self,
        _application: &ApplicationId,
    ) -> Result<Vec<StoredDocument>, RepositoryError> {
        offline()
    }

    fn delete_document(&self, _id: &DocumentId) -> Result<(), RepositoryError> {
        offline()
    }
}
