use crate::config::Config;
use crate::output::print_json;
use chrono::Utc;

pub async fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut dashboard = super::connect(config).await?;
    dashboard.refresh_projects().await?;
    dashboard.refresh_tasks().await?;

    let stats = dashboard.stats(Utc::now());
    if json {
        print_json(&stats)?;
        return Ok(());
    }

    println!("Projects:      {}", stats.total_projects);
    println!("  active:      {}", stats.active_projects);
    println!("  completed:   {}", stats.completed_projects);
    println!("  due in 7d:   {}", stats.due_this_week);
    println!(
        "Tasks:         {} todo, {} in progress, {} completed",
        stats.tasks.todo, stats.tasks.in_progress, stats.tasks.completed
    );
    Ok(())
}
