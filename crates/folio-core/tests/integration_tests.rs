//! Folio Core Integration Tests

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use folio_core::{
    Error, ErrorKind, Result,
    application::services::ContentService,
    config::ContentConfig,
    domain::{PortfolioDocument, ProjectInput, Section, SectionUpdate, SkillCategory},
    storage::{
        ContentStoreClient, DocumentStore, MemoryStore, RawDocument, VersionTag,
        client::encode_document,
    },
};
use serde_json::{Value, json};
use tempfile::TempDir;

const PROJECTS: &str = "data/projects.json";
const PORTFOLIO: &str = "data/portfolio.json";

fn project_input(title: &str) -> ProjectInput {
    ProjectInput {
        title: Some(title.to_string()),
        overview: Some("Renders scenes by tracing light paths".to_string()),
        features: Some(vec!["Reflections".to_string(), "Soft shadows".to_string()]),
        tech_stack: Some(vec!["Rust".to_string()]),
        github_link: Some("https://github.com/alice/ray-tracer".to_string()),
        documentation: None,
    }
}

fn sample_portfolio() -> PortfolioDocument {
    serde_json::from_value(json!({
        "hero": {
            "name": "Alice Example",
            "title": "Systems Engineer",
            "bio": "I build fast, boring software.",
            "resumeLink": "https://example.com/resume.pdf"
        },
        "about": {"text": "Ten years of backend work."},
        "skills": [{"category": "Languages", "items": ["Rust", "Go"]}],
        "contact": {
            "email": "alice@example.com",
            "github": "https://github.com/alice",
            "githubUsername": "alice",
            "linkedin": "https://linkedin.com/in/alice",
            "linkedinName": "Alice Example"
        },
        "footer": {"copyright": "2025 Alice Example", "note": "Built with care"}
    }))
    .unwrap()
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.seed(PROJECTS, b"[]".to_vec());
    store.seed(PORTFOLIO, encode_document(&sample_portfolio()).unwrap());
    store
}

fn service_for(store: Arc<dyn DocumentStore>) -> ContentService {
    ContentService::new(
        ContentStoreClient::with_store(store),
        ContentConfig::default(),
    )
}

fn stored_json(store: &MemoryStore, path: &str) -> Value {
    serde_json::from_slice(&store.contents(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_added_project_is_listed_first() {
    let store = seeded_store();
    let service = service_for(store.clone());

    service.add_project(project_input("Path Finder")).await.unwrap();

    let before = Utc::now();
    let added = service.add_project(project_input("Ray Tracer")).await.unwrap();
    let after = Utc::now();

    assert!(!added.value.id.is_empty());
    assert!(added.value.created_at >= before - chrono::Duration::milliseconds(1));
    assert!(added.value.created_at <= after);

    let projects = service.list_projects().await;
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].title, "Ray Tracer");
    assert_eq!(projects[0].id, added.value.id);
    assert_ne!(projects[0].id, projects[1].id);
}

#[tokio::test]
async fn test_saving_skills_leaves_other_sections_identical() {
    let store = seeded_store();
    let service = service_for(store.clone());
    let before = stored_json(&store, PORTFOLIO);

    let skills = vec![SkillCategory {
        category: "Tools".to_string(),
        items: vec!["Git".to_string(), "Docker".to_string()],
    }];
    service
        .save_portfolio_section(SectionUpdate::Skills(skills.clone()))
        .await
        .unwrap();

    let after = stored_json(&store, PORTFOLIO);
    for section in Section::ALL {
        let key = section.as_str();
        if section == Section::Skills {
            assert_eq!(after[key], serde_json::to_value(&skills).unwrap());
        } else {
            assert_eq!(
                serde_json::to_string_pretty(&before[key]).unwrap(),
                serde_json::to_string_pretty(&after[key]).unwrap(),
                "section {} changed",
                key
            );
        }
    }
}

#[tokio::test]
async fn test_full_portfolio_payload_is_ignored() {
    let store = seeded_store();
    let service = service_for(store.clone());

    // Extra top-level keys in the payload are not part of the about section
    let committed = service
        .save_portfolio_section_json(
            "about",
            json!({"text": "Updated", "fullPortfolio": {"hero": {"name": "Mallory"}}}),
        )
        .await
        .unwrap();

    assert_eq!(committed.value.about.text, "Updated");
    assert_eq!(committed.value.hero.name, "Alice Example");
}

#[tokio::test]
async fn test_short_overview_fails_without_write() {
    let store = seeded_store();
    let service = service_for(store.clone());

    let mut input = project_input("Ray Tracer");
    input.overview = Some("Short".to_string());

    let err = service.add_project(input).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(err.field_errors().len(), 1);
    assert_eq!(err.field_errors()[0].field, "overview");
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_every_field_error_is_reported() {
    let store = seeded_store();
    let service = service_for(store.clone());

    let err = service
        .add_project(ProjectInput::default())
        .await
        .unwrap_err();
    let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["title", "overview", "features", "techStack", "githubLink"]
    );
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn test_unconfigured_store_falls_back_to_local_data() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(
        dir.path().join(PROJECTS),
        r#"[{"id": "1700000000000", "title": "Local Project", "overview": "Served from disk",
            "features": ["Offline"], "techStack": ["Rust"],
            "githubLink": "https://github.com/alice/local", "createdAt": "2023-11-14T22:13:20.000Z"}]"#,
    )
    .unwrap();

    let client = ContentStoreClient::unconfigured(["GITHUB_TOKEN", "GITHUB_OWNER", "GITHUB_REPO"]);
    let err = client
        .fetch_document::<Value>(PROJECTS)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotConfigured { .. }));

    let service = ContentService::new(
        client,
        ContentConfig {
            local_data_dir: dir.path().to_path_buf(),
            ..ContentConfig::default()
        },
    );
    assert!(!service.is_configured());

    let projects = service.list_projects().await;
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].title, "Local Project");

    // No local portfolio file: an empty document rather than an error
    assert_eq!(service.get_portfolio().await, PortfolioDocument::default());
}

#[tokio::test]
async fn test_unconfigured_writes_are_refused() {
    let service = ContentService::new(
        ContentStoreClient::unconfigured(["GITHUB_TOKEN"]),
        ContentConfig::default(),
    );

    let err = service
        .add_project(project_input("Ray Tracer"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotConfigured);
    assert!(err.to_string().contains("GITHUB_TOKEN"));

    let err = service
        .save_portfolio_section(SectionUpdate::Skills(Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotConfigured);
}

#[tokio::test]
async fn test_second_writer_with_same_tag_conflicts() {
    let store = seeded_store();
    let writer_a = ContentStoreClient::with_store(store.clone());
    let writer_b = ContentStoreClient::with_store(store.clone());

    let seen_by_a = writer_a.fetch_document::<Value>(PROJECTS).await.unwrap();
    let seen_by_b = writer_b.fetch_document::<Value>(PROJECTS).await.unwrap();
    assert_eq!(seen_by_a.version, seen_by_b.version);

    writer_a
        .write_document(PROJECTS, &json!([{"from": "a"}]), &seen_by_a.version, "a")
        .await
        .unwrap();
    let err = writer_b
        .write_document(PROJECTS, &json!([{"from": "b"}]), &seen_by_b.version, "b")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VersionConflict);
    assert!(err.to_string().contains("out of date"));
    assert_eq!(stored_json(&store, PROJECTS), json!([{"from": "a"}]));
    assert_eq!(store.commits().len(), 1);
}

/// Lets a competing write land between a coordinator's fetch and its commit
struct RacingStore {
    inner: Arc<MemoryStore>,
    raced: AtomicBool,
}

#[async_trait]
impl DocumentStore for RacingStore {
    async fn get_document(&self, path: &str) -> Result<RawDocument> {
        self.inner.get_document(path).await
    }

    async fn put_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            let current = self.inner.get_document(path).await?;
            self.inner
                .put_document(path, current.bytes, &current.version, "competing edit")
                .await?;
        }
        self.inner.put_document(path, bytes, expected, message).await
    }

    fn describe(&self) -> String {
        "racing".to_string()
    }
}

#[tokio::test]
async fn test_coordinator_does_not_retry_conflicts() {
    let store = seeded_store();
    let racing = Arc::new(RacingStore {
        inner: store.clone(),
        raced: AtomicBool::new(false),
    });
    let service = service_for(racing);

    let err = service
        .add_project(project_input("Ray Tracer"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::VersionConflict);
    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].message, "competing edit");
    assert_eq!(stored_json(&store, PROJECTS), json!([]));
}

#[tokio::test]
async fn test_deleted_project_is_not_listed() {
    let store = seeded_store();
    let service = service_for(store.clone());

    let keep = service.add_project(project_input("Keeper")).await.unwrap().value;
    let gone = service.add_project(project_input("Ray Tracer")).await.unwrap().value;

    let deleted = service.delete_project(&gone.id).await.unwrap();
    assert_eq!(deleted.value, gone);
    assert_eq!(
        store.commits().last().unwrap().message,
        "chore: delete project 'Ray Tracer'"
    );

    let ids: Vec<_> = service
        .list_projects()
        .await
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![keep.id]);
}

#[tokio::test]
async fn test_update_preserves_identity() {
    let store = seeded_store();
    let service = service_for(store.clone());
    let original = service.add_project(project_input("Ray Tracer")).await.unwrap().value;

    let input: ProjectInput = serde_json::from_value(json!({
        "id": "1",
        "createdAt": "1999-01-01T00:00:00.000Z",
        "title": "Ray Tracer 2",
        "overview": "Now with global illumination",
        "features": ["Path tracing"],
        "techStack": ["Rust", "wgpu"],
        "githubLink": "https://github.com/alice/ray-tracer",
        "documentation": "https://docs.example.com/ray-tracer"
    }))
    .unwrap();

    let updated = service
        .update_project(&original.id, input)
        .await
        .unwrap()
        .value;

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.title, "Ray Tracer 2");
    assert_eq!(
        updated.documentation.as_deref(),
        Some("https://docs.example.com/ray-tracer")
    );
    assert_eq!(
        store.commits().last().unwrap().message,
        "fix: update project 'Ray Tracer 2'"
    );

    let stored = service.get_project(&original.id).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_write_then_fetch_returns_new_tag() {
    let store = seeded_store();
    let client = ContentStoreClient::with_store(store.clone());

    let before = client
        .fetch_document::<PortfolioDocument>(PORTFOLIO)
        .await
        .unwrap();
    let mut portfolio = before.value.clone();
    portfolio.footer.note = "Rebuilt".to_string();

    let tag = client
        .write_document(PORTFOLIO, &portfolio, &before.version, "update: footer section updated")
        .await
        .unwrap();
    let after = client
        .fetch_document::<PortfolioDocument>(PORTFOLIO)
        .await
        .unwrap();

    assert_eq!(after.value, portfolio);
    assert_eq!(after.version, tag);
    assert_ne!(after.version, before.version);
}

#[tokio::test]
async fn test_stored_projects_are_pretty_printed() {
    let store = seeded_store();
    let service = service_for(store.clone());
    service.add_project(project_input("Ray Tracer")).await.unwrap();

    let text = String::from_utf8(store.contents(PROJECTS).unwrap()).unwrap();
    assert!(text.starts_with("[\n  {\n    \"id\": "));
    assert!(text.contains("\"techStack\""));
    assert!(!text.contains("\"documentation\""));
}

/// Fails the first read with a transient error, then behaves normally
struct FlakyStore {
    inner: Arc<MemoryStore>,
    failed: AtomicBool,
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get_document(&self, path: &str) -> Result<RawDocument> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(Error::TransientFailure("connection reset".to_string()));
        }
        self.inner.get_document(path).await
    }

    async fn put_document(
        &self,
        path: &str,
        bytes: Vec<u8>,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag> {
        self.inner.put_document(path, bytes, expected, message).await
    }

    fn describe(&self) -> String {
        "flaky".to_string()
    }
}

fn project_json(overview: &str) -> String {
    json!([{
        "id": "1700000000000",
        "title": "Ray Tracer",
        "overview": overview,
        "features": ["Reflections"],
        "techStack": ["Rust"],
        "githubLink": "https://github.com/alice/ray-tracer",
        "createdAt": "2023-11-14T22:13:20.000Z"
    }])
    .to_string()
}

#[tokio::test]
async fn test_patch_takes_unset_fields_from_the_store() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(
        dir.path().join(PROJECTS),
        project_json("stale local overview of the tracer"),
    )
    .unwrap();

    let store = seeded_store();
    store.seed(
        PROJECTS,
        project_json("fresh remote overview of the tracer").into_bytes(),
    );
    let flaky = Arc::new(FlakyStore {
        inner: store.clone(),
        failed: AtomicBool::new(false),
    });
    let service = ContentService::new(
        ContentStoreClient::with_store(flaky),
        ContentConfig {
            local_data_dir: dir.path().to_path_buf(),
            ..ContentConfig::default()
        },
    );
    let patch = ProjectInput {
        title: Some("Ray Tracer 2".to_string()),
        ..ProjectInput::default()
    };

    // A failed read aborts the edit instead of borrowing local values
    let err = service
        .patch_project("1700000000000", patch.clone())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientFailure);
    assert!(store.commits().is_empty());

    let updated = service
        .patch_project("1700000000000", patch)
        .await
        .unwrap()
        .value;
    assert_eq!(updated.title, "Ray Tracer 2");
    assert_eq!(updated.overview, "fresh remote overview of the tracer");

    let stored = String::from_utf8(store.contents(PROJECTS).unwrap()).unwrap();
    assert!(stored.contains("fresh remote overview"));
    assert!(!stored.contains("stale local overview"));
    assert_eq!(
        store.commits().last().unwrap().message,
        "fix: update project 'Ray Tracer 2'"
    );
}

#[tokio::test]
async fn test_patch_validates_the_merged_record() {
    let store = seeded_store();
    store.seed(
        PROJECTS,
        project_json("fresh remote overview of the tracer").into_bytes(),
    );
    let service = service_for(store.clone());

    let err = service
        .patch_project(
            "1700000000000",
            ProjectInput {
                overview: Some("Short".to_string()),
                ..ProjectInput::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(err.field_errors()[0].field, "overview");
    assert!(store.commits().is_empty());

    let err = service
        .patch_project("42", ProjectInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_section_save_keeps_unmodelled_keys() {
    let store = seeded_store();
    store.seed(
        PORTFOLIO,
        encode_document(&json!({
            "hero": {
                "name": "A",
                "title": "T",
                "avatar": "me.png",
                "bio": "B",
                "resumeLink": ""
            },
            "about": {"text": "Old"},
            "skills": [{"category": "Languages", "items": ["Rust"], "level": "expert"}],
            "contact": {
                "email": "a@example.com",
                "github": "",
                "githubUsername": "",
                "linkedin": "",
                "linkedinName": "",
                "pgp": "0xABCD"
            },
            "footer": {"copyright": "2025", "note": ""},
            "theme": "dark"
        }))
        .unwrap(),
    );
    let service = service_for(store.clone());
    let before = stored_json(&store, PORTFOLIO);

    service
        .save_portfolio_section(SectionUpdate::About(folio_core::domain::About {
            text: "New".to_string(),
        }))
        .await
        .unwrap();

    let after = stored_json(&store, PORTFOLIO);
    assert_eq!(after["about"]["text"], "New");
    assert_eq!(after["hero"], before["hero"]);
    assert_eq!(after["hero"]["avatar"], "me.png");
    assert_eq!(after["skills"], before["skills"]);
    assert_eq!(after["contact"], before["contact"]);
    assert_eq!(after["theme"], "dark");

    let keys: Vec<&String> = after.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        ["hero", "about", "skills", "contact", "footer", "theme"]
    );
}
