use crate::infra::{load_catalog, parse_category, parse_date, parse_document_type, parse_gender};
use chrono::{NaiveDate, Utc};
use clap::Args;
use scheme_desk::analyzer::{
    validate_document, DocumentEvidence, DocumentType, DocumentValidation, FileDescriptor, Issue,
};
use scheme_desk::config::AppConfig;
use scheme_desk::eligibility::SchemeMatch;
use scheme_desk::error::AppError;
use scheme_desk::profile::{Gender, SocialCategory, UserProfile};

#[derive(Args, Debug)]
pub(crate) struct SchemeArgs {
    /// Applicant age in years
    #[arg(long)]
    pub(crate) age: u32,
    /// Annual household income in rupees
    #[arg(long)]
    pub(crate) income: f64,
    /// State of residence
    #[arg(long)]
    pub(crate) state: String,
    /// Male, Female or Other
    #[arg(long, value_parser = parse_gender)]
    pub(crate) gender: Option<Gender>,
    /// General, OBC, SC, ST or EWS
    #[arg(long, value_parser = parse_category)]
    pub(crate) category: Option<SocialCategory>,
    /// Also list schemes below the eligibility threshold
    #[arg(long)]
    pub(crate) all: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DocumentArgs {
    /// Uploaded file name, e.g. aadhaar.pdf
    #[arg(long)]
    pub(crate) file_name: String,
    /// File size in bytes
    #[arg(long)]
    pub(crate) size: u64,
    /// Document kind (aadhaar, pan, income_certificate, ...)
    #[arg(long, value_parser = parse_document_type, default_value = "aadhaar")]
    pub(crate) doc_type: DocumentType,
    /// Expiry date printed on the document (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) expiry: Option<NaiveDate>,
    /// Name on the applicant profile
    #[arg(long, default_value = "")]
    pub(crate) profile_name: String,
    /// Name read off the document
    #[arg(long)]
    pub(crate) extracted_name: Option<String>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_scheme_finder(args: SchemeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(&config.scoring)?;

    let SchemeArgs {
        age,
        income,
        state,
        gender,
        category,
        all,
    } = args;
    let profile = UserProfile {
        age: Some(age),
        income: Some(income),
        state: Some(state),
        gender,
        category,
        ..UserProfile::default()
    };

    let matches = if all {
        catalog.rank(&profile)
    } else {
        catalog.eligible(&profile)
    };

    println!(
        "Scheme finder: age {}, income ₹{}, {}",
        age,
        income,
        profile.state.as_deref().unwrap_or_default()
    );
    if matches.is_empty() {
        println!("No schemes meet the eligibility threshold for this profile.");
        return Ok(());
    }
    for entry in &matches {
        render_match(entry);
    }
    Ok(())
}

fn render_match(entry: &SchemeMatch) {
    let marker = if entry.eligibility.is_eligible {
        "eligible"
    } else {
        "not eligible"
    };
    println!(
        "\n- {} [{}] {}% ({})",
        entry.scheme.name,
        entry.scheme.category.label(),
        entry.eligibility.match_percentage,
        marker
    );
    println!("  {}", entry.scheme.benefits);
    for criterion in &entry.eligibility.matched_criteria {
        println!("  + {criterion}");
    }
    for criterion in &entry.eligibility.unmatched_criteria {
        println!("  - {criterion}");
    }
    if entry.eligibility.is_eligible && !entry.scheme.documents_required.is_empty() {
        println!(
            "  Documents: {}",
            entry.scheme.documents_required.join(", ")
        );
    }
}

pub(crate) fn run_document_check(args: DocumentArgs) -> Result<(), AppError> {
    let DocumentArgs {
        file_name,
        size,
        doc_type,
        expiry,
        profile_name,
        extracted_name,
        today,
    } = args;

    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    let content_type = mime_guess::from_path(&file_name)
        .first()
        .map_or_else(|| "unknown".to_string(), |mime| mime.essence_str().to_string());

    let evidence = DocumentEvidence {
        doc_type,
        file: Some(FileDescriptor::named(file_name.clone(), size)),
        expiry_date: expiry,
        extracted_name,
    };
    let validation = validate_document(&evidence, &profile_name, today);

    println!(
        "Document check: {} ({}, {content_type}) evaluated {today}",
        file_name,
        doc_type.label()
    );
    render_validation(&validation);
    Ok(())
}

fn render_validation(validation: &DocumentValidation) {
    println!("Status: {:?}", validation.validation_status);
    println!("{}", validation.summary);
    render_issues("Errors", &validation.validation_errors);
    render_issues("Warnings", &validation.warnings);
}

fn render_issues(heading: &str, issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    println!("\n{heading}");
    for issue in issues {
        println!("- [{:?}] {}", issue.severity, issue.message);
    }
}
