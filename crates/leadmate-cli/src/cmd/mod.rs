pub mod auth;
pub mod board;
pub mod chat;
pub mod doc;
pub mod project;
pub mod stats;
pub mod team;

use crate::config::Config;
use crate::token::TokenStore;
use anyhow::Context;
use leadmate_api::{ApiClient, Dashboard};

/// Build a dashboard session from the stored token. Every command except
/// `login` goes through here.
pub async fn connect(config: &Config) -> anyhow::Result<Dashboard> {
    let home = Config::home_dir()?;
    let token = TokenStore::new(&home)
        .load()
        .context("not logged in: run 'leadmate login'")?;

    let mut dashboard = Dashboard::new(ApiClient::new(&config.api_url));
    dashboard
        .resume(token)
        .await
        .context("session could not be restored; run 'leadmate login' again")?;
    Ok(dashboard)
}
