use crate::config::Config;
use crate::output::print_json;
use crate::token::TokenStore;
use anyhow::Context;
use leadmate_api::{ApiClient, Dashboard};

pub async fn login(config: &Config, email: &str, json: bool) -> anyhow::Result<()> {
    let password = rpassword::prompt_password("Password: ").context("failed to read password")?;

    let mut dashboard = Dashboard::new(ApiClient::new(&config.api_url));
    dashboard.login(email, &password).await?;

    let home = Config::home_dir()?;
    TokenStore::new(&home).save(dashboard.session.token()?)?;

    let user = dashboard.session.user()?;
    if json {
        print_json(user)?;
    } else {
        println!("Logged in as {} ({})", user.name, user.role);
    }
    Ok(())
}

pub fn logout() -> anyhow::Result<()> {
    let home = Config::home_dir()?;
    TokenStore::new(&home).clear()?;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(config: &Config, json: bool) -> anyhow::Result<()> {
    let dashboard = super::connect(config).await?;
    let user = dashboard.session.user()?;
    if json {
        print_json(user)?;
        return Ok(());
    }
    println!("User:    {} [{}]", user.name, user.id);
    println!("Role:    {}", user.role);
    println!("Company: {}", user.company_id);
    Ok(())
}
