use cyb3ria_chat::{dispatch, ChatClient, ChatView};
use cyb3ria_core::{ConnectionState, Config, Paths};
use cyb3ria_storage::ClientId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::open_store;

/// Lines kept in view before older ones scroll off.
const VIEWPORT: usize = 200;
const QUIT: &str = "/quit";

pub async fn run(paths: &Paths, endpoint: Option<String>) -> anyhow::Result<()> {
    let config = Config::load_or_default(paths)?;
    let store = open_store(paths, &config);
    let client_id = ClientId::load_or_create(store.as_ref())?;
    let endpoint = endpoint.unwrap_or_else(|| config.chat.endpoint.clone());

    let (client, mut events) = ChatClient::open(&endpoint, client_id, config.chat.event_buffer)?;
    info!(
        endpoint = %client.endpoint(),
        client_id = %client.client_id(),
        "Chat started, type {} to leave",
        QUIT
    );

    let mut view = ChatView::new(std::io::stdout(), VIEWPORT);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if !dispatch(&mut view, &event) {
                        break;
                    }
                }
                None => break,
            },
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) if line.trim() == QUIT => {
                    input_open = false;
                    if !leave(&client).await {
                        break;
                    }
                }
                Ok(Some(line)) => {
                    if let Err(e) = client.submit(&line).await {
                        warn!(error = %e, "Message not sent");
                    }
                }
                Ok(None) => {
                    input_open = false;
                    if !leave(&client).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read input");
                    input_open = false;
                    if !leave(&client).await {
                        break;
                    }
                }
            },
        }
    }

    Ok(())
}

/// Start a graceful close. Returns `true` when a `Closed` notification is
/// still on its way and the caller should keep draining events.
async fn leave(client: &ChatClient) -> bool {
    if client.state().await != ConnectionState::Open {
        return false;
    }
    match client.close().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Failed to close chat connection");
            false
        }
    }
}
