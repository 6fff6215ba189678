//! Folio CLI - edit portfolio content stored in a GitHub repository

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use folio_core::application::services::{Committed, ContentService};
use folio_core::auth::AdminAuth;
use folio_core::config::Config;
use folio_core::domain::{Project, ProjectInput, Section, SectionUpdate};
use folio_core::storage::DocumentKind;
use serde::Serialize;
use serde_json::json;
use tracing::warn;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Portfolio content editor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Directory holding the bundled local copy (data/*.json)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// View and edit portfolio sections
    Portfolio {
        #[command(subcommand)]
        action: PortfolioAction,
    },

    /// Admin sessions
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List all projects, newest first
    List,
    /// Show project details
    Show { id: String },
    /// Add a project
    Add {
        #[command(flatten)]
        fields: ProjectFields,
    },
    /// Update a project; omitted fields keep their current values
    Update {
        id: String,
        #[command(flatten)]
        fields: ProjectFields,
    },
    /// Delete a project
    Delete { id: String },
}

#[derive(clap::Args)]
struct ProjectFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    overview: Option<String>,
    /// Feature bullet (repeatable)
    #[arg(long = "feature")]
    features: Vec<String>,
    /// Technology (repeatable)
    #[arg(long = "tech")]
    tech_stack: Vec<String>,
    /// https://github.com/<owner>/<repo>
    #[arg(long = "github")]
    github_link: Option<String>,
    /// Documentation URL
    #[arg(long = "docs")]
    documentation: Option<String>,
}

impl ProjectFields {
    /// Raw input; flags that were not given stay unset
    fn into_input(self) -> ProjectInput {
        let list = |values: Vec<String>| (!values.is_empty()).then_some(values);

        ProjectInput {
            title: self.title,
            overview: self.overview,
            features: list(self.features),
            tech_stack: list(self.tech_stack),
            github_link: self.github_link,
            documentation: self.documentation,
        }
    }
}

#[derive(Subcommand)]
enum PortfolioAction {
    /// Show the portfolio document or one section
    Show {
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Replace one section with a JSON value
    Set {
        /// hero, about, skills, contact or footer
        section: String,
        /// Read the value from a file
        #[arg(long, conflicts_with = "json", required_unless_present = "json")]
        file: Option<PathBuf>,
        /// Inline JSON value
        #[arg(long)]
        json: Option<String>,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Log in with the admin password and print a session token
    Login {
        #[arg(long)]
        password: String,
    },
    /// Check a session token; exits non-zero unless it is valid
    Check { token: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// List all configuration values
    List,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable
    let directive = if cli.quiet { "folio=warn" } else { "folio=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, "Failed to load .env file");
        }
    }

    let format = cli.format;
    if let Err(err) = run(cli).await {
        report_error(&err, format);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.content.local_data_dir = dir;
    }

    let out = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Projects { action } => cmd_projects(&config, action, out).await,
        Commands::Portfolio { action } => cmd_portfolio(&config, action, out).await,
        Commands::Auth { action } => cmd_auth(&config, action, out),
        Commands::Config { action } => cmd_config(&config, action, out),
        Commands::Doctor => cmd_doctor(&config, out).await,
    }
}

// ============================================================================
// Output
// ============================================================================

#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Informational line, suppressed by --quiet
    fn note(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

fn report_error(err: &anyhow::Error, format: OutputFormat) {
    let Some(error) = err.downcast_ref::<folio_core::Error>() else {
        if format == OutputFormat::Json {
            eprintln!("{}", json!({ "error": { "message": err.to_string() } }));
        } else {
            eprintln!("Error: {:#}", err);
        }
        return;
    };

    if format == OutputFormat::Json {
        let fields: Vec<_> = error
            .field_errors()
            .iter()
            .map(|f| json!({ "field": f.field, "message": f.message }))
            .collect();
        eprintln!(
            "{}",
            json!({
                "error": {
                    "code": error.code(),
                    "kind": format!("{:?}", error.kind()),
                    "message": error.to_string(),
                    "fields": fields,
                    "suggestion": error.suggestion(),
                }
            })
        );
        return;
    }

    if error.field_errors().is_empty() {
        eprintln!("Error [{}]: {}", error.code(), error);
    } else {
        eprintln!("Error [{}]: Validation failed", error.code());
        for field in error.field_errors() {
            eprintln!("  - {}: {}", field.field, field.message);
        }
    }
    if let Some(suggestion) = error.suggestion() {
        eprintln!("  Suggestion: {}", suggestion);
    }
}

fn print_project(p: &Project) {
    println!("Project: {}", p.title);
    println!("  ID: {}", p.id);
    println!("  Overview: {}", p.overview);
    println!("  Features:");
    for feature in &p.features {
        println!("    - {}", feature);
    }
    println!("  Tech stack: {}", p.tech_stack.join(", "));
    println!("  GitHub: {}", p.github_link);
    if let Some(docs) = &p.documentation {
        println!("  Documentation: {}", docs);
    }
    println!("  Created: {}", p.created_at.format("%Y-%m-%d %H:%M:%S"));
}

fn committed_json<T: Serialize>(key: &str, committed: &Committed<T>) -> serde_json::Value {
    json!({ key: committed.value, "version": committed.version })
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_projects(config: &Config, action: ProjectAction, out: Output) -> anyhow::Result<()> {
    let service = ContentService::from_config(config)?;

    match action {
        ProjectAction::List => {
            let projects = service.list_projects().await;
            if out.is_json() {
                return out.json(&projects);
            }
            if !service.is_configured() {
                out.note("Content store not configured; showing local data.");
            }
            if projects.is_empty() {
                out.note("No projects found.");
                out.note("\nAdd one with: folio projects add --title <title> ...");
            } else {
                out.note("Projects:");
                for p in projects {
                    println!("  {} - {} ({})", p.id, p.title, p.tech_stack.join(", "));
                }
            }
        }
        ProjectAction::Show { id } => {
            let project = service.get_project(&id).await?;
            if out.is_json() {
                return out.json(&project);
            }
            print_project(&project);
        }
        ProjectAction::Add { fields } => {
            let committed = service.add_project(fields.into_input()).await?;
            if out.is_json() {
                return out.json(&committed_json("project", &committed));
            }
            out.note(format!(
                "Project '{}' added (id {}).",
                committed.value.title, committed.value.id
            ));
        }
        ProjectAction::Update { id, fields } => {
            let committed = service.patch_project(&id, fields.into_input()).await?;
            if out.is_json() {
                return out.json(&committed_json("project", &committed));
            }
            out.note(format!("Project '{}' updated.", committed.value.title));
        }
        ProjectAction::Delete { id } => {
            let committed = service.delete_project(&id).await?;
            if out.is_json() {
                return out.json(&committed_json("project", &committed));
            }
            out.note(format!(
                "Project '{}' deleted (id {}).",
                committed.value.title, committed.value.id
            ));
        }
    }
    Ok(())
}

async fn cmd_portfolio(
    config: &Config,
    action: PortfolioAction,
    out: Output,
) -> anyhow::Result<()> {
    let service = ContentService::from_config(config)?;

    match action {
        PortfolioAction::Show { section } => {
            let portfolio = service.get_portfolio().await;
            let value = match section {
                Some(name) => portfolio.section_json(name.parse::<Section>()?)?,
                None => serde_json::to_value(&portfolio)?,
            };
            if !out.is_json() && !service.is_configured() {
                out.note("Content store not configured; showing local data.");
            }
            out.json(&value)?;
        }
        PortfolioAction::Set {
            section,
            file,
            json: inline,
        } => {
            let text = match (file, inline) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
                (None, Some(text)) => text,
                (None, None) => anyhow::bail!("Provide the section value with --file or --json"),
            };
            let value: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| anyhow::anyhow!("Section value is not valid JSON: {}", e))?;

            let update = SectionUpdate::from_json(&section, value)?;
            let saved = update.section();
            let committed = service.save_portfolio_section(update).await?;
            if out.is_json() {
                return out.json(&committed_json("portfolio", &committed));
            }
            out.note(format!("Section '{}' saved.", saved));
        }
    }
    Ok(())
}

fn cmd_auth(config: &Config, action: AuthAction, out: Output) -> anyhow::Result<()> {
    let auth = AdminAuth::from_config(&config.auth);
    let now = Utc::now();

    match action {
        AuthAction::Login { password } => {
            let token = auth.issue_session(&password, now)?;
            let expires_at = now + auth.session_ttl();
            if out.is_json() {
                return out.json(&json!({ "token": token, "expiresAt": expires_at.to_rfc3339() }));
            }
            println!("{}", token);
            if !out.quiet {
                eprintln!("Session valid until {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
        AuthAction::Check { token } => {
            let status = auth.check_session(&token, now);
            if out.is_json() {
                out.json(&json!({ "status": status }))?;
            } else {
                println!("Session: {}", status);
            }
            if !status.is_valid() {
                anyhow::bail!("Session token is {}", status);
            }
        }
    }
    Ok(())
}

fn cmd_config(config: &Config, action: ConfigAction, out: Output) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::List => {
            let items = config.list()?;
            if out.is_json() {
                let map: serde_json::Map<_, _> = items
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect();
                return out.json(&map);
            }
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(config: &Config, out: Output) -> anyhow::Result<()> {
    let service = ContentService::from_config(config)?;
    let auth = AdminAuth::from_config(&config.auth);
    let missing = config.store.missing();

    let mut local = Vec::new();
    for kind in [DocumentKind::Projects, DocumentKind::Portfolio] {
        let path = service.fallback().path_for(kind);
        let available = service.fallback().is_available(kind).await;
        local.push((kind, path, available));
    }

    if out.is_json() {
        let local_json: Vec<_> = local
            .iter()
            .map(|(kind, path, available)| {
                json!({ "document": kind, "path": path.display().to_string(), "available": available })
            })
            .collect();
        return out.json(&json!({
            "store": {
                "configured": service.is_configured(),
                "missing": missing,
                "repository": config.store.owner.as_ref().zip(config.store.repo.as_ref())
                    .map(|(owner, repo)| format!("{}/{}@{}", owner, repo, config.store.branch)),
            },
            "auth": { "configured": auth.is_configured() },
            "local": local_json,
        }));
    }

    out.note("Folio Health Check");
    out.note("==================");
    out.note("");

    let mut all_ok = true;

    if service.is_configured() {
        println!(
            "[OK] Content store: {}/{}@{} (token {})",
            config.store.owner.as_deref().unwrap_or_default(),
            config.store.repo.as_deref().unwrap_or_default(),
            config.store.branch,
            config.store.redacted_token().unwrap_or_default()
        );
    } else {
        all_ok = false;
        println!("[!!] Content store: Not configured");
        println!("     Missing: {}", missing.join(", "));
    }

    if auth.is_configured() {
        println!("[OK] Admin password: Configured");
    } else {
        all_ok = false;
        println!("[!!] Admin password: Not configured");
        println!("     Set ADMIN_PASSWORD environment variable");
    }

    for (kind, path, available) in &local {
        if *available {
            println!("[OK] Local {}: {}", kind, path.display());
        } else {
            println!(
                "[--] Local {}: {} (missing, fallback reads return empty data)",
                kind,
                path.display()
            );
        }
    }

    match Config::config_path() {
        Ok(path) if path.exists() => println!("[OK] Config file: {}", path.display()),
        Ok(path) => println!("[--] Config file: {} (using defaults)", path.display()),
        Err(e) => println!("[!!] Config file: Error - {}", e),
    }

    out.note("");
    if all_ok {
        out.note("All checks passed!");
    } else {
        out.note("Some checks failed. See above for details.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_project_flags_parse() {
        let cli = Cli::try_parse_from([
            "folio",
            "projects",
            "add",
            "--title",
            "Ray Tracer",
            "--feature",
            "Reflections",
            "--feature",
            "Shadows",
            "--tech",
            "Rust",
        ])
        .unwrap();

        let Commands::Projects {
            action: ProjectAction::Add { fields },
        } = cli.command
        else {
            panic!("expected projects add");
        };
        let input = fields.into_input();
        assert_eq!(input.title.as_deref(), Some("Ray Tracer"));
        assert_eq!(input.features.unwrap(), vec!["Reflections", "Shadows"]);
        assert!(input.overview.is_none());
    }

    #[test]
    fn test_update_leaves_missing_flags_unset() {
        let cli = Cli::try_parse_from([
            "folio", "projects", "update", "1", "--title", "New", "--tech", "Go",
        ])
        .unwrap();

        let Commands::Projects {
            action: ProjectAction::Update { id, fields },
        } = cli.command
        else {
            panic!("expected projects update");
        };
        let input = fields.into_input();
        assert_eq!(id, "1");
        assert_eq!(input.title.as_deref(), Some("New"));
        assert!(input.overview.is_none());
        assert!(input.features.is_none());
        assert_eq!(input.tech_stack.unwrap(), vec!["Go"]);
    }

    #[test]
    fn test_portfolio_set_requires_a_value() {
        assert!(Cli::try_parse_from(["folio", "portfolio", "set", "about"]).is_err());
        assert!(
            Cli::try_parse_from(["folio", "portfolio", "set", "about", "--json", "{}"]).is_ok()
        );
    }
}
