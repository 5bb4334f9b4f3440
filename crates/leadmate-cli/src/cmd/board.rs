use crate::config::Config;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use leadmate_core::task::{self, Task};
use leadmate_core::types::{EntityId, TaskStatus};
use leadmate_core::views;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Move a task to another column (todo | in_progress | completed)
    Move { id: String, status: TaskStatus },
    /// Ask the backend to generate a task list for this lead
    Generate,
}

/// `leadmate board` — the kanban view.
pub async fn board(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_tasks().await?;

    let columns = views::task_columns(&dashboard.store);
    if json {
        print_json(&serde_json::json!({
            "counts": columns.counts(),
            "todo": columns.todo,
            "in_progress": columns.in_progress,
            "completed": columns.completed,
        }))?;
        return Ok(());
    }

    if dashboard.store.tasks.is_empty() {
        println!("No tasks. Try 'leadmate task generate'.");
        return Ok(());
    }

    println!("{}", task::summarize(&dashboard.store.tasks.list()));
    println!();
    for (label, column) in [
        ("TODO", &columns.todo),
        ("IN PROGRESS", &columns.in_progress),
        ("COMPLETED", &columns.completed),
    ] {
        println!("{label} ({})", column.len());
        if !column.is_empty() {
            print_table(
                &["ID", "PRIORITY", "DUE", "TITLE"],
                column.iter().map(|&t| row(t)).collect(),
            );
        }
        println!();
    }
    Ok(())
}

pub async fn run(config: &Config, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Move { id, status } => move_task(config, &id, status, json).await,
        TaskSubcommand::Generate => generate(config, json).await,
    }
}

fn row(t: &Task) -> Vec<String> {
    vec![
        t.id.to_string(),
        t.priority.to_string(),
        t.due_date.map(|d| d.to_string()).unwrap_or_default(),
        t.title.clone(),
    ]
}

async fn move_task(config: &Config, id: &str, status: TaskStatus, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_tasks().await?;
    dashboard.move_task(&EntityId::new(id), status).await?;

    let counts = views::task_columns(&dashboard.store).counts();
    if json {
        print_json(&serde_json::json!({ "id": id, "status": status, "counts": counts }))?;
    } else {
        println!("Moved task [{id}] to {status}");
        println!(
            "todo: {}, in progress: {}, completed: {}",
            counts.todo, counts.in_progress, counts.completed
        );
    }
    Ok(())
}

async fn generate(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_tasks().await?;
    let count = dashboard.generate_tasks().await?;

    if json {
        print_json(&serde_json::json!({ "generated": count }))?;
    } else {
        println!("Generated {count} tasks.");
    }
    Ok(())
}
