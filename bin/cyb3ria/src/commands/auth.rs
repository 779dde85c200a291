use cyb3ria_core::{Config, Paths};
use cyb3ria_request::{LoginRequest, RegistrationRequest, RequestHelper};

use super::open_store;

fn helper(paths: &Paths) -> anyhow::Result<RequestHelper> {
    let config = Config::load_or_default(paths)?;
    Ok(RequestHelper::from_config(&config, open_store(paths, &config))?)
}

pub async fn login(paths: &Paths, username: String, password: String) -> anyhow::Result<()> {
    let response = helper(paths)?
        .login(&LoginRequest { username, password })
        .await?;
    println!("✓ {}", response.message);
    Ok(())
}

pub async fn register(paths: &Paths, request: RegistrationRequest) -> anyhow::Result<()> {
    let response = helper(paths)?.register(&request).await?;
    println!("✓ {}", response.message);
    Ok(())
}
