//! Portfolio projects
//!
//! A project is stored as one element of the JSON array in the projects
//! document. Field names follow the persisted camelCase layout.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A project shown on the portfolio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Creation time in Unix milliseconds, unique within the collection
    pub id: String,
    pub title: String,
    pub overview: String,
    pub features: Vec<String>,
    pub tech_stack: Vec<String>,
    /// `https://github.com/<owner>/<repo>`
    pub github_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Sanitized project fields, everything except identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFormData {
    pub title: String,
    pub overview: String,
    pub features: Vec<String>,
    pub tech_stack: Vec<String>,
    pub github_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Project fields as submitted by an editor, possibly incomplete
///
/// Unknown keys such as `id` or `createdAt` are ignored on deserialization,
/// so a caller cannot change a project's identity through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInput {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub features: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub github_link: Option<String>,
    pub documentation: Option<String>,
}

impl From<ProjectFormData> for ProjectInput {
    fn from(form: ProjectFormData) -> Self {
        Self {
            title: Some(form.title),
            overview: Some(form.overview),
            features: Some(form.features),
            tech_stack: Some(form.tech_stack),
            github_link: Some(form.github_link),
            documentation: form.documentation,
        }
    }
}

impl ProjectInput {
    /// Fill every unset field from `base`
    pub fn or_from(self, base: &Project) -> Self {
        Self {
            title: self.title.or_else(|| Some(base.title.clone())),
            overview: self.overview.or_else(|| Some(base.overview.clone())),
            features: self.features.or_else(|| Some(base.features.clone())),
            tech_stack: self.tech_stack.or_else(|| Some(base.tech_stack.clone())),
            github_link: self.github_link.or_else(|| Some(base.github_link.clone())),
            documentation: self.documentation.or_else(|| base.documentation.clone()),
        }
    }
}

impl Project {
    /// Create a project from sanitized fields, assigning a fresh id and timestamp
    pub fn create(form: ProjectFormData, existing: &[Project], now: DateTime<Utc>) -> Self {
        let created_at = now.trunc_subsecs(3);
        Self {
            id: next_project_id(existing, created_at),
            title: form.title,
            overview: form.overview,
            features: form.features,
            tech_stack: form.tech_stack,
            github_link: form.github_link,
            documentation: form.documentation,
            created_at,
        }
    }

    /// Replace every editable field; `id` and `created_at` are kept
    pub fn apply(&mut self, form: ProjectFormData) {
        self.title = form.title;
        self.overview = form.overview;
        self.features = form.features;
        self.tech_stack = form.tech_stack;
        self.github_link = form.github_link;
        self.documentation = form.documentation;
    }
}

/// Time-derived id that does not collide with any existing project
pub fn next_project_id(existing: &[Project], now: DateTime<Utc>) -> String {
    let mut candidate = now.timestamp_millis();
    while existing.iter().any(|p| p.id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}

/// Sort newest first; projects created at the same instant keep their order
pub fn sort_newest_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form(title: &str) -> ProjectFormData {
        ProjectFormData {
            title: title.to_string(),
            overview: "An overview long enough".to_string(),
            features: vec!["Fast".to_string()],
            tech_stack: vec!["Rust".to_string()],
            github_link: "https://github.com/alice/demo".to_string(),
            documentation: None,
        }
    }

    #[test]
    fn test_create_assigns_millisecond_id() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        let project = Project::create(form("Demo"), &[], now);
        assert_eq!(project.id, now.timestamp_millis().to_string());
        assert_eq!(project.created_at, now);
    }

    #[test]
    fn test_next_id_skips_taken_ids() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        let first = Project::create(form("One"), &[], now);
        let second = Project::create(form("Two"), std::slice::from_ref(&first), now);
        assert_ne!(first.id, second.id);
        assert_eq!(
            second.id,
            (now.timestamp_millis() + 1).to_string()
        );
    }

    #[test]
    fn test_apply_keeps_identity() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let mut project = Project::create(form("Before"), &[], now);
        let id = project.id.clone();
        project.apply(form("After"));
        assert_eq!(project.title, "After");
        assert_eq!(project.id, id);
        assert_eq!(project.created_at, now);
    }

    #[test]
    fn test_serialized_layout() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        let project = Project::create(form("Demo"), &[], now);
        let json = serde_json::to_string(&project).unwrap();
        assert!(json.starts_with(r#"{"id":"#));
        assert!(json.contains(r#""techStack":["Rust"]"#));
        assert!(json.contains(r#""githubLink":"https://github.com/alice/demo""#));
        assert!(json.ends_with(r#""createdAt":"2025-01-31T12:00:00.000Z"}"#));
        assert!(!json.contains("documentation"));
    }

    #[test]
    fn test_input_ignores_identity_fields() {
        let input: ProjectInput = serde_json::from_str(
            r#"{"id":"evil","createdAt":"1999-01-01T00:00:00.000Z","title":"T"}"#,
        )
        .unwrap();
        assert_eq!(input.title.as_deref(), Some("T"));
        assert!(input.overview.is_none());
    }

    #[test]
    fn test_or_from_keeps_set_fields() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let mut base = Project::create(form("Base"), &[], now);
        base.documentation = Some("https://docs.example.com".to_string());

        let merged = ProjectInput {
            title: Some("Renamed".to_string()),
            ..ProjectInput::default()
        }
        .or_from(&base);

        assert_eq!(merged.title.as_deref(), Some("Renamed"));
        assert_eq!(merged.overview.as_deref(), Some(base.overview.as_str()));
        assert_eq!(merged.features.as_deref(), Some(base.features.as_slice()));
        assert_eq!(merged.documentation, base.documentation);
    }

    #[test]
    fn test_sort_newest_first() {
        let old = Project::create(
            form("Old"),
            &[],
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        );
        let new = Project::create(
            form("New"),
            &[],
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        );
        let mut projects = vec![old, new];
        sort_newest_first(&mut projects);
        assert_eq!(projects[0].title, "New");
    }
}
