use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use scheme_desk::analyzer::DocumentType;
use scheme_desk::config::ScoringConfig;
use scheme_desk::eligibility::SchemeCatalog;
use scheme_desk::error::MalformedInput;
use scheme_desk::profile::{Gender, SocialCategory};
use scheme_desk::risk::{RiskModel, RiskPolicy};
use scheme_desk::tracker::{
    Application, ApplicationId, ApplicationStatus, ApplicationStore, DocumentId, DocumentStore,
    RepositoryError, StoredDocument, User, UserId, UserStore,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store backing the tracker. Nothing survives a restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    applications: Arc<Mutex<HashMap<ApplicationId, Application>>>,
    documents: Arc<Mutex<Vec<StoredDocument>>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{what} mutex poisoned")))
}

/// Another user already holds this email. Checked under the users lock.
fn email_in_use(users: &HashMap<UserId, User>, user: &User) -> bool {
    let Some(email) = user.profile.email.as_deref() else {
        return false;
    };
    users
        .values()
        .any(|other| other.id != user.id && other.profile.email.as_deref() == Some(email))
}

impl UserStore for InMemoryStore {
    fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = lock(&self.users, "users")?;
        if guard.contains_key(&user.id) || email_in_use(&guard, &user) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.users, "users")?;
        if !guard.contains_key(&user.id) {
            return Err(RepositoryError::NotFound);
        }
        if email_in_use(&guard, &user) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id.clone(), user);
        Ok(())
    }

    fn fetch_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let guard = lock(&self.users, "users")?;
        Ok(guard.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let guard = lock(&self.users, "users")?;
        Ok(guard
            .values()
            .find(|user| user.profile.email.as_deref() == Some(email))
            .cloned())
    }
}

impl ApplicationStore for InMemoryStore {
    fn insert_application(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.applications, "applications")?;
        let open_for_scheme = guard.values().any(|existing| {
            existing.user_id == application.user_id
                && existing.scheme_id == application.scheme_id
                && existing.status != ApplicationStatus::Rejected
        });
        if guard.contains_key(&application.id) || open_for_scheme {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update_application(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.applications, "applications")?;
        if guard.contains_key(&application.id) {
            guard.insert(application.id.clone(), application);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.applications, "applications")?;
        Ok(guard.get(id).cloned())
    }

    fn applications_for(&self, user: &UserId) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.applications, "applications")?;
        Ok(guard
            .values()
            .filter(|application| &application.user_id == user)
            .cloned()
            .collect())
    }
}

impl DocumentStore for InMemoryStore {
    fn insert_document(&self, document: StoredDocument) -> Result<StoredDocument, RepositoryError> {
        let mut guard = lock(&self.documents, "documents")?;
        if guard.iter().any(|stored| stored.id == document.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(document.clone());
        Ok(document)
    }

    fn update_document(&self, document: StoredDocument) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.documents, "documents")?;
        match guard.iter_mut().find(|stored| stored.id == document.id) {
            Some(stored) => {
                *stored = document;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_document(&self, id: &DocumentId) -> Result<Option<StoredDocument>, RepositoryError> {
        let guard = lock(&self.documents, "documents")?;
        Ok(guard.iter().find(|stored| &stored.id == id).cloned())
    }

    /// Upload order.
    fn documents_for(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<StoredDocument>, RepositoryError> {
        let guard = lock(&self.documents, "documents")?;
        Ok(guard
            .iter()
            .filter(|stored| &stored.application_id == application)
            .cloned()
            .collect())
    }

    fn delete_document(&self, id: &DocumentId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.documents, "documents")?;
        let before = guard.len();
        guard.retain(|stored| &stored.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// The configured catalog file, or the bundled national schemes.
pub(crate) fn load_catalog(config: &ScoringConfig) -> Result<SchemeCatalog, MalformedInput> {
    let catalog = match &config.catalog {
        Some(path) => SchemeCatalog::load(path)?,
        None => SchemeCatalog::embedded()?,
    };
    info!(schemes = catalog.len(), "scheme catalog loaded");
    Ok(catalog)
}

pub(crate) fn load_risk_model(config: &ScoringConfig) -> Result<RiskModel, MalformedInput> {
    RiskPolicy::from_config(config)?.into_model()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Reuse the wire spelling of an enum for command-line values.
fn parse_label<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|_| format!("'{raw}' is not a recognised {what}"))
}

pub(crate) fn parse_gender(raw: &str) -> Result<Gender, String> {
    parse_label(raw, "gender (Male, Female, Other)")
}

pub(crate) fn parse_category(raw: &str) -> Result<SocialCategory, String> {
    parse_label(raw, "category (General, OBC, SC, ST, EWS)")
}

pub(crate) fn parse_document_type(raw: &str) -> Result<DocumentType, String> {
    parse_label(&raw.trim().to_ascii_lowercase(), "document type")
}
