use crate::config::Config;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use leadmate_core::types::EntityId;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum TeamSubcommand {
    /// List a project's team members
    List { project: String },
    /// Add a member by uploading their resume
    Add { project: String, resume: PathBuf },
}

pub async fn run(config: &Config, subcmd: TeamSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TeamSubcommand::List { project } => list(config, &project, json).await,
        TeamSubcommand::Add { project, resume } => add(config, &project, &resume, json).await,
    }
}

async fn list(config: &Config, project: &str, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_members(&EntityId::new(project)).await?;

    if json {
        print_json(&dashboard.store.members.list())?;
        return Ok(());
    }

    if dashboard.store.members.is_empty() {
        println!("No team members for '{project}'.");
        return Ok(());
    }

    let rows = dashboard
        .store
        .members
        .iter()
        .map(|m| {
            vec![
                m.id.to_string(),
                m.name.clone(),
                m.email.clone(),
                m.tech_stack.join(", "),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "EMAIL", "TECH STACK"], rows);
    Ok(())
}

async fn add(config: &Config, project: &str, resume: &PathBuf, json: bool) -> anyhow::Result<()> {
    let part = super::doc::read_part(resume)?;

    let mut dashboard = super::connect(config).await?;
    let id = dashboard.add_member(&EntityId::new(project), part).await?;

    if json {
        print_json(&serde_json::json!({ "project": project, "member_id": id }))?;
    } else {
        println!("Added member [{id}] to '{project}'");
    }
    Ok(())
}
