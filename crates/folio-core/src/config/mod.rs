//! Configuration management with file persistence
//!
//! Non-secret settings live in `config.toml`; credentials are read from the
//! environment only. The resulting `Config` is built once at startup and passed
//! by reference into the store client and auth constructors.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::DocumentKind;

/// Folio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub content: ContentConfig,
    pub auth: AuthConfig,
}

/// GitHub repository that holds the content documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    #[serde(skip)]
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub committer_name: String,
    pub committer_email: String,
}

/// Where the documents live, remotely and in the bundled local copy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub local_data_dir: PathBuf,
    pub projects_path: String,
    pub portfolio_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip)]
    pub admin_password: Option<String>,
    pub session_ttl_hours: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo: None,
            branch: "main".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
            committer_name: "Portfolio Bot".to_string(),
            committer_email: "bot@example.com".to_string(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            local_data_dir: PathBuf::from("."),
            projects_path: "data/projects.json".to_string(),
            portfolio_path: "data/portfolio.json".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: None,
            session_ttl_hours: 24,
        }
    }
}

impl StoreConfig {
    /// Environment variable names of the settings that are still absent
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.token.is_none() {
            missing.push("GITHUB_TOKEN");
        }
        if self.owner.is_none() {
            missing.push("GITHUB_OWNER");
        }
        if self.repo.is_none() {
            missing.push("GITHUB_REPO");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn redacted_token(&self) -> Option<String> {
        self.token.as_ref().map(|key| {
            let count = key.chars().count();
            if count <= 4 {
                "***".to_string()
            } else {
                let suffix: String = key.chars().skip(count - 4).collect();
                format!("***{}", suffix)
            }
        })
    }
}

impl ContentConfig {
    /// Repository-relative path of a document
    pub fn path_for(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Projects => &self.projects_path,
            DocumentKind::Portfolio => &self.portfolio_path,
        }
    }

    /// Path of the bundled local copy of a document
    pub fn local_path_for(&self, kind: DocumentKind) -> PathBuf {
        self.local_data_dir.join(self.path_for(kind))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("FOLIO_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("folio")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default file, or defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Load the config file and overlay the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay settings from an environment lookup
    ///
    /// Blank values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = get("GITHUB_TOKEN") {
            self.store.token = Some(token);
        }
        if let Some(owner) = get("GITHUB_OWNER") {
            self.store.owner = Some(owner);
        }
        if let Some(repo) = get("GITHUB_REPO") {
            self.store.repo = Some(repo);
        }
        if let Some(branch) = get("GITHUB_BRANCH") {
            self.store.branch = branch;
        }
        if let Some(url) = get("GITHUB_API_URL") {
            self.store.api_base_url = url;
        }
        if let Some(password) = get("ADMIN_PASSWORD") {
            self.auth.admin_password = Some(password);
        }
        if let Some(dir) = get("FOLIO_DATA_DIR") {
            self.content.local_data_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.branch.trim().is_empty() {
            return Err(anyhow!("store.branch must not be empty"));
        }
        if !self.store.api_base_url.starts_with("http://")
            && !self.store.api_base_url.starts_with("https://")
        {
            return Err(anyhow!(
                "store.api_base_url must be an http(s) URL, got '{}'",
                self.store.api_base_url
            ));
        }
        if self.store.timeout_secs == 0 {
            return Err(anyhow!("store.timeout_secs must be greater than zero"));
        }
        if self.content.projects_path == self.content.portfolio_path {
            return Err(anyhow!(
                "content.projects_path and content.portfolio_path must differ"
            ));
        }
        if self.auth.session_ttl_hours == 0 {
            return Err(anyhow!("auth.session_ttl_hours must be greater than zero"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        let unset = || "(not set)".to_string();
        match key {
            "store.owner" => Ok(self.store.owner.clone().unwrap_or_else(unset)),
            "store.repo" => Ok(self.store.repo.clone().unwrap_or_else(unset)),
            "store.branch" => Ok(self.store.branch.clone()),
            "store.api_base_url" => Ok(self.store.api_base_url.clone()),
            "store.timeout_secs" => Ok(self.store.timeout_secs.to_string()),
            "store.committer_name" => Ok(self.store.committer_name.clone()),
            "store.committer_email" => Ok(self.store.committer_email.clone()),
            "store.token" => Ok(self
                .store
                .redacted_token()
                .unwrap_or_else(|| "(not set - use GITHUB_TOKEN env var)".to_string())),

            "content.local_data_dir" => Ok(self.content.local_data_dir.display().to_string()),
            "content.projects_path" => Ok(self.content.projects_path.clone()),
            "content.portfolio_path" => Ok(self.content.portfolio_path.clone()),

            "auth.session_ttl_hours" => Ok(self.auth.session_ttl_hours.to_string()),
            "auth.admin_password" => Ok(if self.auth.admin_password.is_some() {
                "(set)".to_string()
            } else {
                "(not set - use ADMIN_PASSWORD env var)".to_string()
            }),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `folio config list` to see available keys.",
                key
            )),
        }
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "store.owner",
            "store.repo",
            "store.branch",
            "store.api_base_url",
            "store.timeout_secs",
            "store.committer_name",
            "store.committer_email",
            "store.token",
            "content.local_data_dir",
            "content.projects_path",
            "content.portfolio_path",
            "auth.session_ttl_hours",
            "auth.admin_password",
        ];

        keys.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }
}
