//! Command surface: maps subcommands onto the store and the orchestrator.

use crate::api::GitlabClient;
use crate::config::Config;
use crate::db::{DbProject, ListFilter, ProjectPatch, ProjectStore};
use crate::error::GlsyncError;
use crate::sync;
use clap::{Parser, Subcommand};
use glsync_schema::Visibility;

#[derive(Parser, Debug)]
#[command(
    name = "glsync",
    version,
    about = "Pull GitLab project metadata into a local SQLite mirror"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch all projects from the remote API and upsert them locally
    Fetch,
    /// List stored projects
    List {
        /// Only projects with this visibility (private, internal, public)
        #[arg(long)]
        visibility: Option<Visibility>,
        /// Only archived (true) or only unarchived (false) projects
        #[arg(long)]
        archived: Option<bool>,
    },
    /// Show one stored project, including its namespace
    Show { id: i64 },
    /// Update fields of a stored project
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// private, internal or public
        #[arg(long)]
        visibility: Option<Visibility>,
        #[arg(long)]
        archived: Option<bool>,
    },
    /// Delete a stored project (namespace rows go with it)
    Delete { id: i64 },
}

/// Executes one subcommand against the configured store / remote.
pub async fn run(command: Command, cfg: &Config) -> Result<(), GlsyncError> {
    let store = ProjectStore::connect(&cfg.basic.database_url).await?;

    match command {
        Command::Fetch => {
            let client = GitlabClient::new(&cfg.gitlab)?;
            let report = sync::sync_all(&client, &store).await?;
            println!("Processed {} projects: {report}", report.processed());
        }

        Command::List {
            visibility,
            archived,
        } => {
            let filter = ListFilter {
                visibility,
                archived,
            };
            let projects = store.list(&filter).await?;
            print_project_table(&projects);
        }

        Command::Show { id } => {
            let project = store.get(id).await?;
            let namespace = store.namespace_of(id).await?;
            print_project_details(&project);
            if let Some(ns) = namespace {
                println!();
                println!("Namespace:");
                println!("  {:<18} {}", "ID:", ns.id);
                println!("  {:<18} {}", "Name:", ns.name);
                println!("  {:<18} {}", "Path:", ns.path);
                println!("  {:<18} {}", "Kind:", ns.kind.as_deref().unwrap_or("-"));
                println!(
                    "  {:<18} {}",
                    "Full Path:",
                    ns.full_path.as_deref().unwrap_or("-")
                );
            }
        }

        Command::Update {
            id,
            name,
            description,
            visibility,
            archived,
        } => {
            let patch = ProjectPatch {
                name,
                description,
                visibility,
                archived,
            };
            if patch.is_empty() {
                return Err(GlsyncError::Validation(
                    "nothing to update: pass at least one of --name, --description, \
                     --visibility, --archived"
                        .to_string(),
                ));
            }
            let updated = store.update(id, &patch).await?;
            println!("Project {id} updated.");
            print_project_details(&updated);
        }

        Command::Delete { id } => {
            store.delete(id).await?;
            println!("Project {id} deleted.");
        }
    }

    Ok(())
}

fn print_project_table(projects: &[DbProject]) {
    if projects.is_empty() {
        println!("No projects found in the database.");
        return;
    }

    println!(
        "{:<8} {:<32} {:<12} {:<20}",
        "ID", "Name", "Visibility", "Last Activity"
    );
    println!("{}", "-".repeat(74));
    for p in projects {
        let last_activity = p
            .last_activity_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        let name: String = p.name.chars().take(32).collect();
        println!(
            "{:<8} {:<32} {:<12} {:<20}",
            p.id, name, p.visibility, last_activity
        );
    }
    println!();
    println!("Total: {} projects", projects.len());
}

fn print_project_details(p: &DbProject) {
    println!("{:<18} {}", "ID:", p.id);
    println!("{:<18} {}", "Name:", p.name);
    println!(
        "{:<18} {}",
        "Description:",
        p.description.as_deref().unwrap_or("-")
    );
    println!(
        "{:<18} {}",
        "Full Path:",
        p.path_with_namespace.as_deref().unwrap_or("-")
    );
    println!("{:<18} {}", "Web URL:", p.web_url.as_deref().unwrap_or("-"));
    println!("{:<18} {}", "Visibility:", p.visibility);
    println!("{:<18} {}", "Archived:", p.archived);
    println!(
        "{:<18} {}",
        "Created At:",
        p.created_at
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
    );
    println!(
        "{:<18} {}",
        "Last Activity:",
        p.last_activity_at
            .map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
    );
    println!("{:<18} {}", "Last Synced:", p.last_synced.to_rfc3339());
}
