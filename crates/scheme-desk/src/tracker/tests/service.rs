use super::common::*;
use crate::analyzer::domain::{DocumentType, IssueKind, ValidationStatus};
use crate::analyzer::validation::BatchStatus;
use crate::eligibility::SchemeCatalog;
use crate::profile::UserProfile;
use crate::risk::{RiskLevel, RiskModel};
use crate::tracker::domain::{ApplicationStatus, DocumentId, NewApplication, Revalidation, UserId};
use crate::tracker::repository::{DocumentStore, RepositoryError};
use crate::tracker::{TrackerError, TrackerService};
use chrono::NaiveDate;
use std::sync::Arc;

fn apply(scheme_id: &str) -> NewApplication {
    NewApplication {
        scheme_id: scheme_id.to_string(),
    }
}

#[test]
fn register_normalizes_email_and_rejects_duplicates() {
    let (service, _) = build_service();

    let user = service
        .register_user(profile("  Priya Sharma ", "Priya.Sharma@Example.IN"))
        .expect("registration succeeds");
    assert_eq!(user.profile.name.as_deref(), Some("Priya Sharma"));
    assert_eq!(user.profile.email.as_deref(), Some("priya.sharma@example.in"));
    assert!(user.id.0.starts_with("usr-"));

    let err = service
        .register_user(profile("Priya S", "priya.sharma@example.in"))
        .expect_err("duplicate email");
    assert!(matches!(err, TrackerError::EmailTaken(_)));
}

#[test]
fn register_validates_profile_fields() {
    let (service, _) = build_service();

    let cases = [
        profile("", "a@b.in"),
        profile("Kiran", ""),
        profile("Kiran", "kiran-at-example"),
        UserProfile {
            age: Some(130),
            ..profile("Kiran", "kiran@example.in")
        },
        UserProfile {
            income: Some(-5.0),
            ..profile("Kiran", "kiran@example.in")
        },
    ];

    for case in cases {
        let err = service.register_user(case).expect_err("invalid profile");
        assert!(matches!(err, TrackerError::InvalidProfile(_)), "{err}");
    }
}

#[test]
fn update_user_merges_present_fields() {
    let (service, _) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");

    let updated = service
        .update_user(
            &user.id,
            UserProfile {
                income: Some(95_000.0),
                district: Some("Pune".to_string()),
                ..UserProfile::default()
            },
        )
        .expect("update succeeds");

    assert_eq!(updated.profile.income, Some(95_000.0));
    assert_eq!(updated.profile.district.as_deref(), Some("Pune"));
    assert_eq!(updated.profile.age, Some(34));
    assert_eq!(service.user(&user.id).expect("stored").profile, updated.profile);
}

#[test]
fn update_user_rejects_taken_email() {
    let (service, _) = build_service();
    service
        .register_user(profile("Asha", "asha@example.in"))
        .expect("first user");
    let second = service
        .register_user(profile("Ravi", "ravi@example.in"))
        .expect("second user");

    let err = service
        .update_user(
            &second.id,
            UserProfile {
                email: Some("ASHA@example.in".to_string()),
                ..UserProfile::default()
            },
        )
        .expect_err("email in use");
    assert!(matches!(err, TrackerError::EmailTaken(_)));
}

#[test]
fn update_user_trims_the_name() {
    let (service, _) = build_service();
    let user = service
        .register_user(profile("Asha", "asha@example.in"))
        .expect("registered");

    let updated = service
        .update_user(
            &user.id,
            UserProfile {
                name: Some("  Asha Patil ".to_string()),
                ..UserProfile::default()
            },
        )
        .expect("update succeeds");
    assert_eq!(updated.profile.name.as_deref(), Some("Asha Patil"));

    let err = service
        .update_user(
            &user.id,
            UserProfile {
                name: Some("   ".to_string()),
                ..UserProfile::default()
            },
        )
        .expect_err("blank name");
    assert!(matches!(err, TrackerError::InvalidProfile(_)));
}

#[test]
fn create_application_scores_before_documents() {
    let (service, _) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");

    let created = service
        .create_application(&user.id, apply("ayushman-bharat"))
        .expect("application created");

    // 0 * .15 + 100 * .3 + 100 * .35 + 30 * .1 + 10 * .1
    assert_eq!(created.risk.overall_risk, 69);
    assert_eq!(created.application.risk_score, 69);
    assert_eq!(created.application.risk_level, RiskLevel::Medium);
    assert_eq!(created.application.status, ApplicationStatus::Submitted);
    assert_eq!(created.application.scheme_name, "Ayushman Bharat (PM-JAY)");
    assert_eq!(created.application.applied_date, fixed_now());
}

#[test]
fn create_application_checks_scheme_and_duplicates() {
    let (service, _) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");

    let err = service
        .create_application(&user.id, apply("moon-mission"))
        .expect_err("unknown scheme");
    assert!(matches!(err, TrackerError::SchemeNotFound(_)));

    let first = service
        .create_application(&user.id, apply("atal-pension"))
        .expect("first application");
    let err = service
        .create_application(&user.id, apply("atal-pension"))
        .expect_err("duplicate");
    assert!(matches!(err, TrackerError::DuplicateApplication(_)));

    service
        .update_status(&user.id, &first.application.id, ApplicationStatus::Rejected)
        .expect("status updated");
    service
        .create_application(&user.id, apply("atal-pension"))
        .expect("reapply after rejection");
}

#[test]
fn store_conflicts_win_when_lookups_race() {
    let (service, store) = build_service();
    let user = service
        .register_user(profile("Asha", "asha@example.in"))
        .expect("registered");
    service
        .create_application(&user.id, apply("atal-pension"))
        .expect("first application");

    store.serve_stale_lookups();

    let err = service
        .register_user(profile("Asha Again", "ASHA@example.in"))
        .expect_err("email already stored");
    assert!(matches!(err, TrackerError::EmailTaken(ref email) if email == "asha@example.in"));

    let err = service
        .create_application(&user.id, apply("atal-pension"))
        .expect_err("open application already stored");
    assert!(matches!(err, TrackerError::DuplicateApplication(ref id) if id == "atal-pension"));
}

#[test]
fn unknown_users_cannot_apply() {
    let (service, _) = build_service();
    let err = service
        .create_application(&UserId("usr-missing".to_string()), apply("atal-pension"))
        .expect_err("missing user");
    assert!(matches!(err, TrackerError::UserNotFound(_)));
}

#[test]
fn applications_are_private_to_their_owner() {
    let (service, _) = build_service();
    let owner = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("owner");
    let other = service
        .register_user(profile("Imran Khan", "imran@example.in"))
        .expect("other");
    let created = service
        .create_application(&owner.id, apply("pm-mudra"))
        .expect("created");

    let err = service
        .application(&other.id, &created.application.id)
        .expect_err("forbidden");
    assert!(matches!(err, TrackerError::Forbidden(_)));

    let err = service
        .recalculate_risk(&other.id, &created.application.id)
        .expect_err("forbidden");
    assert!(matches!(err, TrackerError::Forbidden(_)));
}

#[test]
fn listing_is_newest_first_and_stats_tally_statuses() {
    let (service, _) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");

    let mut ids = Vec::new();
    for scheme in ["pm-mudra", "stand-up-india", "atal-pension"] {
        let created = service
            .create_application(&user.id, apply(scheme))
            .expect("created");
        ids.push(created.application.id);
    }
    service
        .update_status(&user.id, &ids[0], ApplicationStatus::Approved)
        .expect("approved");
    service
        .update_status(&user.id, &ids[1], ApplicationStatus::UnderReview)
        .expect("under review");

    let listed: Vec<_> = service
        .applications(&user.id)
        .expect("listed")
        .into_iter()
        .map(|application| application.id)
        .collect();
    let mut expected = ids.clone();
    expected.reverse();
    assert_eq!(listed, expected);

    let stats = service.stats(&user.id).expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.under_review, 1);
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.rejected, 0);
}

#[test]
fn uploads_lower_the_recalculated_risk() {
    let (service, _) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");
    let application = service
        .create_application(&user.id, apply("pm-awas-urban"))
        .expect("created")
        .application;

    for (doc_type, file) in [
        (DocumentType::Aadhaar, "aadhaar.pdf"),
        (DocumentType::Pan, "pan.png"),
        (DocumentType::IncomeCertificate, "income.pdf"),
        (DocumentType::AddressProof, "address.jpg"),
        (DocumentType::BankStatement, "statement.pdf"),
    ] {
        let outcome = service
            .upload_document(&user.id, upload(&application.id, doc_type, file))
            .expect("upload succeeds");
        assert_eq!(outcome.validation.validation_status, ValidationStatus::Valid);
    }

    let risk = service
        .recalculate_risk(&user.id, &application.id)
        .expect("risk recalculated");

    // 30 * .1 + 10 * .1
    assert_eq!(risk.overall_risk, 4);
    assert_eq!(risk.risk_level, RiskLevel::Low);

    let detail = service
        .application(&user.id, &application.id)
        .expect("detail");
    assert_eq!(detail.application.risk_score, 4);
    assert_eq!(detail.documents.len(), 5);
    assert_eq!(detail.documents[1].content_type, "image/png");
}

#[test]
fn unsupported_files_are_not_stored() {
    let (service, store) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");
    let application = service
        .create_application(&user.id, apply("pm-kisan"))
        .expect("created")
        .application;

    let err = service
        .upload_document(
            &user.id,
            upload(&application.id, DocumentType::Aadhaar, "aadhaar.docx"),
        )
        .expect_err("docx rejected");
    assert!(matches!(err, TrackerError::UnsupportedContent { .. }));
    assert!(store
        .documents_for(&application.id)
        .expect("listing")
        .is_empty());
}

#[test]
fn expired_uploads_are_stored_as_invalid() {
    let (service, _) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");
    let application = service
        .create_application(&user.id, apply("pm-kisan"))
        .expect("created")
        .application;

    let mut expired = upload(&application.id, DocumentType::IncomeCertificate, "income.pdf");
    expired.expiry_date = NaiveDate::from_ymd_opt(2025, 5, 1);

    let outcome = service
        .upload_document(&user.id, expired)
        .expect("stored anyway");

    assert_eq!(outcome.document.validation_status, ValidationStatus::Invalid);
    assert_eq!(
        outcome.document.validation_errors[0].kind,
        IssueKind::ExpiredDocument
    );
}

#[test]
fn revalidation_uses_fresh_extracted_name() {
    let (service, store) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");
    let application = service
        .create_application(&user.id, apply("pm-kisan"))
        .expect("created")
        .application;
    let document = service
        .upload_document(&user.id, upload(&application.id, DocumentType::Pan, "pan.pdf"))
        .expect("uploaded")
        .document;

    let validation = service
        .revalidate_document(
            &user.id,
            &document.id,
            Revalidation {
                extracted_name: Some("Gopal Verma".to_string()),
            },
        )
        .expect("revalidated");

    assert_eq!(validation.validation_status, ValidationStatus::Invalid);
    let stored = store
        .fetch_document(&document.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.validation_status, ValidationStatus::Invalid);
    assert_eq!(stored.extracted_name.as_deref(), Some("Gopal Verma"));
}

#[test]
fn batch_validation_updates_every_document() {
    let (service, store) = build_service();
    let user = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("registered");
    let application = service
        .create_application(&user.id, apply("pm-kisan"))
        .expect("created")
        .application;

    service
        .upload_document(&user.id, upload(&application.id, DocumentType::Aadhaar, "aadhaar.pdf"))
        .expect("uploaded");
    let mut mismatched = upload(&application.id, DocumentType::Pan, "pan.pdf");
    mismatched.extracted_name = Some("Someone Else".to_string());
    service
        .upload_document(&user.id, mismatched)
        .expect("uploaded");

    let batch = service
        .validate_application_documents(&user.id, &application.id)
        .expect("batch");

    assert_eq!(batch.total_documents, 2);
    assert_eq!(batch.valid_documents, 1);
    assert_eq!(batch.overall_status, BatchStatus::MinorIssues);

    let statuses: Vec<ValidationStatus> = store
        .documents_for(&application.id)
        .expect("listing")
        .into_iter()
        .map(|doc| doc.validation_status)
        .collect();
    assert_eq!(
        statuses,
        vec![ValidationStatus::Valid, ValidationStatus::Invalid]
    );
}

#[test]
fn deleting_documents_checks_ownership() {
    let (service, _) = build_service();
    let owner = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect("owner");
    let other = service
        .register_user(profile("Imran Khan", "imran@example.in"))
        .expect("other");
    let application = service
        .create_application(&owner.id, apply("pm-kisan"))
        .expect("created")
        .application;
    let document = service
        .upload_document(&owner.id, upload(&application.id, DocumentType::Aadhaar, "id.pdf"))
        .expect("uploaded")
        .document;

    let err = service
        .delete_document(&other.id, &document.id)
        .expect_err("not the owner");
    assert!(matches!(err, TrackerError::Forbidden(_)));

    service
        .delete_document(&owner.id, &document.id)
        .expect("deleted");
    let err = service
        .delete_document(&owner.id, &DocumentId(document.id.0.clone()))
        .expect_err("already gone");
    assert!(matches!(err, TrackerError::DocumentNotFound(_)));
}

#[test]
fn eligible_schemes_follow_the_stored_profile() {
    let (service, _) = build_service();
    let user = service
        .register_user(UserProfile {
            age: Some(8),
            income: Some(300_000.0),
            ..profile("Anaya Rao", "anaya@example.in")
        })
        .expect("registered");

    let ids: Vec<String> = service
        .eligible_schemes(&user.id)
        .expect("eligible")
        .into_iter()
        .map(|matched| matched.scheme.id)
        .collect();

    assert_eq!(ids, vec!["ayushman-bharat", "sukanya-samriddhi"]);
}

#[test]
fn store_failures_surface_as_repository_errors() {
    let catalog = Arc::new(SchemeCatalog::embedded().expect("catalog"));
    let service = TrackerService::new(
        Arc::new(UnavailableStore),
        catalog,
        Arc::new(RiskModel::weighted()),
    );

    let err = service
        .register_user(profile("Priya Sharma", "priya@example.in"))
        .expect_err("store offline");
    assert!(matches!(
        err,
        TrackerError::Repository(RepositoryError::Unavailable(_))
    ));
}
