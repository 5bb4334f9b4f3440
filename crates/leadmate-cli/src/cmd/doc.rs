use crate::config::Config;
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use leadmate_api::FilePart;
use leadmate_core::types::EntityId;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum DocSubcommand {
    /// List a project's documents
    List { project: String },
    /// Upload one or more files to a project
    Upload {
        project: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete a document (immediate, not undoable)
    Delete { id: String },
    /// Trigger backend re-analysis of a project's documents
    Sync { project: String },
}

pub async fn run(config: &Config, subcmd: DocSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DocSubcommand::List { project } => list(config, &project, json).await,
        DocSubcommand::Upload { project, files } => upload(config, &project, &files, json).await,
        DocSubcommand::Delete { id } => delete(config, &id, json).await,
        DocSubcommand::Sync { project } => sync(config, &project, json).await,
    }
}

pub(crate) fn read_part(path: &Path) -> anyhow::Result<FilePart> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("not a file path: {}", path.display()))?;
    let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
    Ok(FilePart {
        filename,
        content_type,
        bytes,
    })
}

async fn list(config: &Config, project: &str, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_documents(&EntityId::new(project)).await?;

    if json {
        print_json(&dashboard.store.documents.list())?;
        return Ok(());
    }

    if dashboard.store.documents.is_empty() {
        println!("No documents for '{project}'.");
        return Ok(());
    }

    let rows = dashboard
        .store
        .documents
        .iter()
        .map(|d| {
            vec![
                d.id.to_string(),
                d.filename.clone(),
                format!("{}", d.size),
                if d.has_extracted_text() { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "FILENAME", "SIZE", "EXTRACTED"], rows);
    Ok(())
}

async fn upload(config: &Config, project: &str, files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let parts = files.iter().map(|p| read_part(p)).collect::<Result<Vec<_>, _>>()?;

    let mut dashboard = super::connect(config).await?;
    let count = dashboard
        .upload_documents(&EntityId::new(project), parts)
        .await?;

    if json {
        print_json(&serde_json::json!({ "project": project, "uploaded": count }))?;
    } else {
        println!("Uploaded {count} document(s) to '{project}'");
    }
    Ok(())
}

async fn delete(config: &Config, id: &str, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.delete_document(EntityId::new(id)).await?;

    if json {
        print_json(&serde_json::json!({ "id": id, "deleted": true }))?;
    } else {
        println!("Deleted document [{id}]");
    }
    Ok(())
}

async fn sync(config: &Config, project: &str, json: bool) -> anyhow::Result<()> {
    let dashboard = super::connect(config).await?;
    dashboard.sync_documents(&EntityId::new(project)).await?;

    if json {
        print_json(&serde_json::json!({ "project": project, "sync": "started" }))?;
    } else {
        println!("Analysis started for '{project}'");
    }
    Ok(())
}
