use cyb3ria_core::{Config, Paths};
use cyb3ria_storage::{CsrfTokens, KeyValueStore, CLIENT_ID_KEY};

use super::open_store;

pub async fn run(paths: &Paths) -> anyhow::Result<()> {
    println!("cyb3ria status");
    println!("==============");
    println!();

    let config_path = paths.config_file();
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_path.exists() { "✓" } else { "✗ (defaults)" }
    );

    let config = Config::load_or_default(paths)?;
    let storage_path = config.storage_file(paths);
    println!(
        "Storage:   {} {}",
        storage_path.display(),
        if storage_path.exists() { "✓" } else { "✗ (not created)" }
    );
    println!();

    println!("Chat:      {}", config.chat.endpoint);
    println!("API:       {}", config.http.base_url);
    println!();

    let store = open_store(paths, &config);
    match store.get(CLIENT_ID_KEY)? {
        Some(id) if !id.is_empty() => println!("Client id: {}", id),
        _ => println!("Client id: (generated on first chat)"),
    }
    let held = CsrfTokens::new(store).is_held()?;
    println!("CSRF:      {}", if held { "✓ token held" } else { "✗ none" });

    Ok(())
}
