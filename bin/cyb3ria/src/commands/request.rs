use cyb3ria_core::{Config, Paths};
use cyb3ria_request::RequestHelper;
use serde_json::Value;

use super::open_store;

pub async fn run(paths: &Paths, url: &str, method: &str, body: Option<&str>) -> anyhow::Result<()> {
    let body = parse_body(body)?;
    let config = Config::load_or_default(paths)?;
    let helper = RequestHelper::from_config(&config, open_store(paths, &config))?;

    let data = helper.send(url, method, &body).await?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

/// `--body` as JSON; an omitted body sends `{}`.
fn parse_body(raw: Option<&str>) -> anyhow::Result<Value> {
    match raw {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("--body is not valid JSON: {}", e)),
        None => Ok(Value::Object(serde_json::Map::new())),
    }
}
