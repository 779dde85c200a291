use cyb3ria_core::ChatEvent;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Receiver of chat notifications. Each method fires once per event, in
/// the order events arrived. The defaults only log.
pub trait ChatHandler {
    fn on_open(&mut self) {
        info!("Chat connection open");
    }

    fn on_message(&mut self, text: &str);

    fn on_error(&mut self, error: &str) {
        error!(error = %error, "Chat connection error");
    }

    fn on_close(&mut self) {
        info!("Chat connection closed");
    }
}

/// Route one event to its handler method. Returns `false` once the
/// connection has closed.
pub fn dispatch<H: ChatHandler + ?Sized>(handler: &mut H, event: &ChatEvent) -> bool {
    match event {
        ChatEvent::Open => handler.on_open(),
        ChatEvent::Message(text) => handler.on_message(text),
        ChatEvent::Error(e) => handler.on_error(e),
        ChatEvent::Closed => {
            handler.on_close();
            return false;
        }
    }
    true
}

/// Feed events to `handler` until the connection closes or the sender is gone.
pub async fn drive<H: ChatHandler + ?Sized>(
    events: &mut mpsc::Receiver<ChatEvent>,
    handler: &mut H,
) {
    while let Some(event) = events.recv().await {
        if !dispatch(handler, &event) {
            break;
        }
    }
}
