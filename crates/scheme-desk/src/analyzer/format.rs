use serde::Serialize;

use super::domain::{FileDescriptor, Issue, IssueKind, Severity};

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const MIN_FILE_SIZE: u64 = 10 * 1024;
pub const MAX_FILE_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCheck {
    pub is_valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub extension: String,
    pub size: Option<u64>,
    pub size_formatted: Option<String>,
}

/// Validate extension, size and file name. Warnings never affect validity.
pub fn format_check(file: Option<&FileDescriptor>) -> FormatCheck {
    let Some(file) = file else {
        return FormatCheck {
            is_valid: false,
            errors: vec![Issue::new(
                IssueKind::MissingFile,
                Severity::Critical,
                "No file provided",
            )],
            warnings: Vec::new(),
            file_info: None,
        };
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let name = file.file_name();
    let extension = extension_of(name);

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        errors.push(Issue::new(
            IssueKind::InvalidFormat,
            Severity::Critical,
            format!(
                "File format .{extension} not allowed. Allowed formats: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        ));
    }

    match file.size {
        Some(size) => {
            if size > MAX_FILE_SIZE {
                errors.push(Issue::new(
                    IssueKind::FileTooLarge,
                    Severity::High,
                    format!(
                        "File size {} exceeds maximum {}",
                        format_bytes(size),
                        format_bytes(MAX_FILE_SIZE)
                    ),
                ));
            }
            if size < MIN_FILE_SIZE {
                warnings.push(Issue::new(
                    IssueKind::FileTooSmall,
                    Severity::Medium,
                    format!(
                        "File size {} is unusually small. Please verify the file is complete.",
                        format_bytes(size)
                    ),
                ));
            }
        }
        None => errors.push(Issue::new(
            IssueKind::FileSizeUnknown,
            Severity::High,
            "File size could not be determined",
        )),
    }

    if name.chars().count() > MAX_FILE_NAME_LEN {
        warnings.push(Issue::new(
            IssueKind::LongFilename,
            Severity::Low,
            "File name is very long. Consider renaming for better compatibility.",
        ));
    }

    if name
        .chars()
        .any(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-')))
    {
        warnings.push(Issue::new(
            IssueKind::SpecialCharacters,
            Severity::Low,
            "File name contains special characters. This may cause issues.",
        ));
    }

    FormatCheck {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        file_info: Some(FileInfo {
            name: name.to_string(),
            extension,
            size: file.size,
            size_formatted: file.size.map(format_bytes),
        }),
    }
}

/// Text after the final `.`, lower-cased. A name without a dot yields the
/// whole name.
pub fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

/// Human-readable byte count rounded to two decimals, e.g. `1.5 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
