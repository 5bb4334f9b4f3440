use crate::config::Config;
use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Subcommand;
use leadmate_api::{NewProject, ProjectPatch};
use leadmate_core::types::{EntityId, ProjectStatus};
use leadmate_core::views;

#[derive(Subcommand)]
pub enum ProjectSubcommand {
    /// List projects, grouped by status
    List,
    /// Show full details for one project
    Show { id: String },
    /// Create a project
    Create {
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(long)]
        description: Option<String>,
        /// Deadline as YYYY-MM-DD
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// Team lead id to assign
        #[arg(long)]
        lead: Option<String>,
    },
    /// Update project fields (only the given flags change)
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// planning | active | completed | on_hold | cancelled
        #[arg(long)]
        status: Option<ProjectStatus>,
        /// Progress percentage, 0-100
        #[arg(long)]
        progress: Option<u8>,
        #[arg(long)]
        lead: Option<String>,
    },
    /// Delete a project
    Delete { id: String },
}

pub async fn run(config: &Config, subcmd: ProjectSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProjectSubcommand::List => list(config, json).await,
        ProjectSubcommand::Show { id } => show(config, &id, json).await,
        ProjectSubcommand::Create {
            title,
            description,
            deadline,
            lead,
        } => create(config, &title.join(" "), description, deadline, lead, json).await,
        ProjectSubcommand::Update {
            id,
            title,
            description,
            deadline,
            status,
            progress,
            lead,
        } => {
            let patch = ProjectPatch {
                title,
                description,
                deadline,
                status,
                progress,
                team_lead_id: lead.map(EntityId::new),
            };
            update(config, &id, patch, json).await
        }
        ProjectSubcommand::Delete { id } => delete(config, &id, json).await,
    }
}

fn row(p: &leadmate_core::project::Project) -> Vec<String> {
    vec![
        p.id.to_string(),
        p.status.to_string(),
        format!("{}%", p.progress),
        p.deadline.map(|d| d.to_string()).unwrap_or_default(),
        p.title.clone(),
    ]
}

async fn list(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_projects().await?;

    if json {
        print_json(&dashboard.store.projects.list())?;
        return Ok(());
    }

    if dashboard.store.projects.is_empty() {
        println!("No projects yet.");
        return Ok(());
    }

    let buckets = views::projects_by_status(&dashboard.store);
    for (label, bucket) in [
        ("ACTIVE", &buckets.active),
        ("COMPLETED", &buckets.completed),
        ("OTHER", &buckets.other),
    ] {
        if bucket.is_empty() {
            continue;
        }
        println!("{label} ({})", bucket.len());
        print_table(
            &["ID", "STATUS", "PROGRESS", "DEADLINE", "TITLE"],
            bucket.iter().map(|&p| row(p)).collect(),
        );
        println!();
    }
    Ok(())
}

async fn show(config: &Config, id: &str, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_projects().await?;

    let project = dashboard
        .store
        .projects
        .get(&EntityId::new(id))
        .with_context(|| format!("project '{id}' not found"))?;

    if json {
        print_json(project)?;
        return Ok(());
    }

    println!("Project: {}", project.id);
    println!("Title:    {}", project.title);
    println!("Status:   {}", project.status);
    println!("Progress: {}%", project.progress);
    if let Some(deadline) = project.deadline {
        println!("Deadline: {deadline}");
    }
    if let Some(lead) = &project.team_lead_id {
        println!("Lead:     {lead}");
    }
    if let Some(description) = &project.description {
        println!("\n{description}");
    }
    Ok(())
}

async fn create(
    config: &Config,
    title: &str,
    description: Option<String>,
    deadline: Option<NaiveDate>,
    lead: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    let id = dashboard
        .create_project(NewProject {
            title: title.to_string(),
            description,
            deadline,
            team_lead_id: lead.map(EntityId::new),
        })
        .await?;

    if json {
        print_json(&serde_json::json!({ "id": id, "title": title }))?;
    } else {
        println!("Created project [{id}]: {title}");
    }
    Ok(())
}

async fn update(config: &Config, id: &str, patch: ProjectPatch, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_projects().await?;
    dashboard.update_project(&EntityId::new(id), patch).await?;

    if json {
        print_json(&serde_json::json!({ "id": id, "updated": true }))?;
    } else {
        println!("Updated project [{id}]");
    }
    Ok(())
}

async fn delete(config: &Config, id: &str, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_projects().await?;
    dashboard.delete_project(EntityId::new(id)).await?;

    if json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("Deleted project [{id}]");
    }
    Ok(())
}
