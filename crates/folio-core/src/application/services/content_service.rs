//! Content service
//!
//! Coordinates every edit as one read and at most one write against the
//! content store:
//!
//! 1. refuse locally if the store is not configured
//! 2. validate the edit (projects only), with no I/O; a patch is validated
//!    once merged with the fetched record
//! 3. fetch the current document and its version tag
//! 4. compute the new document
//! 5. write it back guarded by the fetched tag
//!
//! A stale tag surfaces as `Error::VersionConflict` and is never retried or
//! merged here. Display reads degrade to the bundled local copy instead of
//! failing.

use chrono::Utc;
use tracing::{info, warn};

use crate::application::validators::ProjectValidator;
use crate::config::{Config, ContentConfig};
use crate::domain::{PortfolioDocument, Project, ProjectInput, SectionUpdate, sort_newest_first};
use crate::error::{Error, Result};
use crate::storage::{ContentStoreClient, DocumentKind, LocalFallbackReader, VersionTag};

/// Outcome of an accepted write
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<T> {
    pub value: T,
    /// Tag of the document revision created by the write
    pub version: VersionTag,
}

/// Service for reading and editing site content
///
/// # Example
///
/// ```ignore
/// let service = ContentService::from_config(&config)?;
///
/// let projects = service.list_projects().await;
/// let added = service.add_project(input).await?;
/// println!("created {} at {}", added.value.id, added.version);
/// ```
#[derive(Debug, Clone)]
pub struct ContentService {
    client: ContentStoreClient,
    fallback: LocalFallbackReader,
    content: ContentConfig,
}

impl ContentService {
    pub fn new(client: ContentStoreClient, content: ContentConfig) -> Self {
        Self {
            client,
            fallback: LocalFallbackReader::new(content.clone()),
            content,
        }
    }

    /// Build the service for the GitHub store named in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ContentStoreClient::from_config(&config.store)?;
        Ok(Self::new(client, config.content.clone()))
    }

    /// Whether writes can reach the content store
    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    pub fn client(&self) -> &ContentStoreClient {
        &self.client
    }

    pub fn fallback(&self) -> &LocalFallbackReader {
        &self.fallback
    }

    fn path(&self, kind: DocumentKind) -> &str {
        self.content.path_for(kind)
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.client.is_configured() {
            Ok(())
        } else {
            Err(Error::not_configured(
                self.client.missing_settings().iter().cloned(),
            ))
        }
    }

    // ========== Projects ==========

    /// Projects in display order, newest first
    ///
    /// Falls back to the local copy when the store is unavailable.
    pub async fn list_projects(&self) -> Vec<Project> {
        let path = self.path(DocumentKind::Projects);
        match self.client.fetch_document::<Vec<Project>>(path).await {
            Ok(doc) => {
                let mut projects = doc.value;
                sort_newest_first(&mut projects);
                projects
            }
            Err(e) => {
                warn!(document = %path, error = %e, "Store read failed, serving local projects");
                self.fallback.read_projects().await
            }
        }
    }

    /// A single project as shown by `list_projects`
    pub async fn get_project(&self, id: &str) -> Result<Project> {
        self.list_projects()
            .await
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))
    }

    /// Validate and add a project at the front of the collection
    pub async fn add_project(&self, input: ProjectInput) -> Result<Committed<Project>> {
        self.ensure_configured()?;
        ProjectValidator::validate(&input).into_result()?;
        let form = ProjectValidator::sanitize(input);

        let path = self.path(DocumentKind::Projects);
        let current = self.client.fetch_document::<Vec<Project>>(path).await?;
        let mut projects = current.value;

        let project = Project::create(form, &projects, Utc::now());
        projects.insert(0, project.clone());

        let message = format!("feat: add project '{}'", project.title);
        let version = self
            .client
            .write_document(path, &projects, &current.version, &message)
            .await?;

        info!(project_id = %project.id, title = %project.title, "Added project");
        Ok(Committed {
            value: project,
            version,
        })
    }

    /// Replace every editable field of project `id`
    ///
    /// `id` and `createdAt` are kept whatever the input contains.
    pub async fn update_project(
        &self,
        id: &str,
        input: ProjectInput,
    ) -> Result<Committed<Project>> {
        self.ensure_configured()?;
        ProjectValidator::validate(&input).into_result()?;
        let form = ProjectValidator::sanitize(input);

        let path = self.path(DocumentKind::Projects);
        let current = self.client.fetch_document::<Vec<Project>>(path).await?;
        let mut projects = current.value;

        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        project.apply(form);
        let updated = project.clone();

        let message = format!("fix: update project '{}'", updated.title);
        let version = self
            .client
            .write_document(path, &projects, &current.version, &message)
            .await?;

        info!(project_id = %updated.id, title = %updated.title, "Updated project");
        Ok(Committed {
            value: updated,
            version,
        })
    }

    /// Change only the fields set in `patch`
    ///
    /// Unset fields are taken from the record in the same fetch whose tag
    /// guards the write, so they never come from the local copy. The merged
    /// record is validated after the fetch.
    pub async fn patch_project(&self, id: &str, patch: ProjectInput) -> Result<Committed<Project>> {
        self.ensure_configured()?;

        let path = self.path(DocumentKind::Projects);
        let current = self.client.fetch_document::<Vec<Project>>(path).await?;
        let mut projects = current.value;

        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        let merged = patch.or_from(project);
        ProjectValidator::validate(&merged).into_result()?;
        project.apply(ProjectValidator::sanitize(merged));
        let updated = project.clone();

        let message = format!("fix: update project '{}'", updated.title);
        let version = self
            .client
            .write_document(path, &projects, &current.version, &message)
            .await?;

        info!(project_id = %updated.id, title = %updated.title, "Patched project");
        Ok(Committed {
            value: updated,
            version,
        })
    }

    /// Remove project `id`, returning the removed record
    pub async fn delete_project(&self, id: &str) -> Result<Committed<Project>> {
        self.ensure_configured()?;

        let path = self.path(DocumentKind::Projects);
        let current = self.client.fetch_document::<Vec<Project>>(path).await?;
        let mut projects = current.value;

        let index = projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        let removed = projects.remove(index);

        let message = format!("chore: delete project '{}'", removed.title);
        let version = self
            .client
            .write_document(path, &projects, &current.version, &message)
            .await?;

        info!(project_id = %removed.id, title = %removed.title, "Deleted project");
        Ok(Committed {
            value: removed,
            version,
        })
    }

    // ========== Portfolio ==========

    /// The portfolio document, falling back to the local copy
    pub async fn get_portfolio(&self) -> PortfolioDocument {
        let path = self.path(DocumentKind::Portfolio);
        match self.client.fetch_document::<PortfolioDocument>(path).await {
            Ok(doc) => doc.value,
            Err(e) => {
                warn!(document = %path, error = %e, "Store read failed, serving local portfolio");
                self.fallback.read_portfolio().await
            }
        }
    }

    /// Replace one section wholesale; the other sections are written back as read
    ///
    /// The section is spliced into the stored JSON, so keys the typed
    /// document does not model survive the write.
    pub async fn save_portfolio_section(
        &self,
        update: SectionUpdate,
    ) -> Result<Committed<PortfolioDocument>> {
        self.ensure_configured()?;

        let section = update.section();
        let path = self.path(DocumentKind::Portfolio);
        let current = self.client.fetch_document::<serde_json::Value>(path).await?;
        let mut document = current.value;
        let mut portfolio: PortfolioDocument = serde_json::from_value(document.clone())
            .map_err(|e| Error::DecodeFailure {
                document: path.to_string(),
                reason: e.to_string(),
            })?;
        update.splice_into(&mut document)?;
        portfolio.apply(update);

        let message = format!("update: {} section updated", section);
        let version = self
            .client
            .write_document(path, &document, &current.version, &message)
            .await?;

        info!(section = %section, "Saved portfolio section");
        Ok(Committed {
            value: portfolio,
            version,
        })
    }

    /// Parse an untyped section payload and save it
    pub async fn save_portfolio_section_json(
        &self,
        section: &str,
        value: serde_json::Value,
    ) -> Result<Committed<PortfolioDocument>> {
        self.ensure_configured()?;
        let update = SectionUpdate::from_json(section, value)?;
        self.save_portfolio_section(update).await
    }
}
