//! Project validation
//!
//! Validates project form input and normalizes it before it is persisted.

use std::sync::LazyLock;

use regex::Regex;

use crate::application::errors::{FieldError, ValidationReport};
use crate::domain::{ProjectFormData, ProjectInput};

/// `https://github.com/<owner>/<repo>` with an optional trailing slash
static GITHUB_REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/[A-Za-z0-9_-]+/[A-Za-z0-9_.-]+/?$")
        .expect("GitHub URL pattern is a valid regex")
});

/// Validator for project form input
pub struct ProjectValidator;

impl ProjectValidator {
    pub const TITLE_MIN: usize = 3;
    pub const TITLE_MAX: usize = 100;
    pub const OVERVIEW_MIN: usize = 10;
    pub const OVERVIEW_MAX: usize = 500;

    /// Validate a title
    ///
    /// Rules:
    /// - Required
    /// - Between 3 and 100 characters after trimming
    pub fn validate_title(title: Option<&str>) -> Option<FieldError> {
        Self::validate_length(
            "title",
            "Title",
            title,
            Self::TITLE_MIN,
            Self::TITLE_MAX,
        )
    }

    /// Validate an overview
    ///
    /// Rules:
    /// - Required
    /// - Between 10 and 500 characters after trimming
    pub fn validate_overview(overview: Option<&str>) -> Option<FieldError> {
        Self::validate_length(
            "overview",
            "Overview",
            overview,
            Self::OVERVIEW_MIN,
            Self::OVERVIEW_MAX,
        )
    }

    /// Validate the feature list
    ///
    /// Rules:
    /// - At least one entry that is not blank
    pub fn validate_features(features: Option<&[String]>) -> Option<FieldError> {
        Self::validate_entries(
            "features",
            features,
            "At least one feature is required",
            "At least one non-empty feature is required",
        )
    }

    /// Validate the tech stack
    ///
    /// Rules:
    /// - At least one entry that is not blank
    pub fn validate_tech_stack(tech_stack: Option<&[String]>) -> Option<FieldError> {
        Self::validate_entries(
            "techStack",
            tech_stack,
            "At least one technology is required",
            "At least one non-empty technology is required",
        )
    }

    /// Validate the repository link
    ///
    /// Rules:
    /// - Required
    /// - Must be `https://github.com/<owner>/<repo>`
    pub fn validate_github_link(link: Option<&str>) -> Option<FieldError> {
        let link = link.map(str::trim).unwrap_or_default();

        if link.is_empty() {
            return Some(FieldError::new("githubLink", "GitHub link is required"));
        }

        if !GITHUB_REPO_URL.is_match(link) {
            return Some(FieldError::new(
                "githubLink",
                "Must be a valid GitHub repository URL (e.g., https://github.com/user/repo)",
            ));
        }

        None
    }

    /// Validate every field, collecting all problems
    pub fn validate(input: &ProjectInput) -> ValidationReport {
        let errors = [
            Self::validate_title(input.title.as_deref()),
            Self::validate_overview(input.overview.as_deref()),
            Self::validate_features(input.features.as_deref()),
            Self::validate_tech_stack(input.tech_stack.as_deref()),
            Self::validate_github_link(input.github_link.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();

        ValidationReport::from_errors(errors)
    }

    /// Trim strings, drop blank list entries, and turn blank documentation into `None`
    ///
    /// Apply only after `validate` succeeds so messages reflect the raw input.
    pub fn sanitize(input: ProjectInput) -> ProjectFormData {
        fn clean(entries: Option<Vec<String>>) -> Vec<String> {
            entries
                .unwrap_or_default()
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        }

        ProjectFormData {
            title: input.title.unwrap_or_default().trim().to_string(),
            overview: input.overview.unwrap_or_default().trim().to_string(),
            features: clean(input.features),
            tech_stack: clean(input.tech_stack),
            github_link: input.github_link.unwrap_or_default().trim().to_string(),
            documentation: input
                .documentation
                .map(|doc| doc.trim().to_string())
                .filter(|doc| !doc.is_empty()),
        }
    }

    fn validate_length(
        field: &str,
        label: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) -> Option<FieldError> {
        let value = value.map(str::trim).unwrap_or_default();
        let len = value.chars().count();

        if len == 0 {
            Some(FieldError::new(field, format!("{} is required", label)))
        } else if len < min {
            Some(FieldError::new(
                field,
                format!("{} must be at least {} characters", label, min),
            ))
        } else if len > max {
            Some(FieldError::new(
                field,
                format!("{} must be {} characters or less", label, max),
            ))
        } else {
            None
        }
    }

    fn validate_entries(
        field: &str,
        entries: Option<&[String]>,
        missing: &str,
        blank: &str,
    ) -> Option<FieldError> {
        match entries {
            None | Some([]) => Some(FieldError::new(field, missing)),
            Some(entries) if entries.iter().all(|e| e.trim().is_empty()) => {
                Some(FieldError::new(field, blank))
            }
            Some(_) => None,
        }
    }
}
