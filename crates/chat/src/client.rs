use cyb3ria_core::{ChatEvent, ConnectionState, Error, OutboundMessage, Result};
use cyb3ria_storage::ClientId;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage, WebSocketStream};
use tracing::{debug, error, info, warn};
use url::Url;

type WsSink = futures::stream::SplitSink<
    WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    WsMessage,
>;

/// One chat connection for the lifetime of the handle.
///
/// The socket is opened in the background; notifications arrive on the
/// receiver returned by [`ChatClient::open`]. A connection that fails or
/// closes is never reopened.
pub struct ChatClient {
    client_id: ClientId,
    endpoint: Url,
    state: Arc<Mutex<ConnectionState>>,
    /// Send-half of the socket, present only while the connection is open.
    sink: Arc<Mutex<Option<WsSink>>>,
    reader: JoinHandle<()>,
}

impl ChatClient {
    /// Start connecting to `endpoint`. Only a malformed endpoint fails here;
    /// transport failures are reported as `Error` then `Closed` events.
    pub fn open(
        endpoint: &str,
        client_id: ClientId,
        buffer: usize,
    ) -> Result<(Self, mpsc::Receiver<ChatEvent>)> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("Invalid chat endpoint '{}': {}", endpoint, e)))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::Config(format!(
                "Chat endpoint must use ws:// or wss://, got '{}'",
                endpoint
            )));
        }

        let (events_tx, events_rx) = mpsc::channel(buffer.max(1));
        let state = Arc::new(Mutex::new(ConnectionState::Connecting));
        let sink: Arc<Mutex<Option<WsSink>>> = Arc::new(Mutex::new(None));

        let reader = tokio::spawn(run_connection(
            url.clone(),
            state.clone(),
            sink.clone(),
            events_tx,
        ));

        Ok((
            Self {
                client_id,
                endpoint: url,
                state,
                sink,
                reader,
            },
            events_rx,
        ))
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.lock().await
    }

    /// Serialize `text` with this client's id and send it.
    ///
    /// Fails with `Error::Transport` when the connection is not open.
    pub async fn submit(&self, text: &str) -> Result<()> {
        let payload = OutboundMessage::new(self.client_id.as_str(), text).to_json()?;

        let state = self.state().await;
        if !state.is_open() {
            warn!(state = %state, "Dropping message, connection is not open");
            return Err(Error::Transport("connection is not open".to_string()));
        }

        let mut guard = self.sink.lock().await;
        let write = guard
            .as_mut()
            .ok_or_else(|| Error::Transport("connection is not open".to_string()))?;

        if let Err(e) = write.send(WsMessage::Text(payload)).await {
            error!(error = %e, "Failed to send chat message");
            drop(guard);
            transition(&self.state, ConnectionState::Errored).await;
            return Err(Error::Transport(format!("Failed to send message: {}", e)));
        }
        debug!(len = text.len(), "Chat message sent");
        Ok(())
    }

    /// Send a close frame. The reader reports `Closed` once the peer answers.
    pub async fn close(&self) -> Result<()> {
        let mut guard = self.sink.lock().await;
        match guard.as_mut() {
            Some(write) => write
                .close()
                .await
                .map_err(|e| Error::Transport(format!("Failed to close connection: {}", e))),
            None => Ok(()),
        }
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn transition(state: &Mutex<ConnectionState>, next: ConnectionState) {
    let mut current = state.lock().await;
    if current.can_transition_to(next) {
        debug!(from = %*current, to = %next, "Connection state changed");
        *current = next;
    } else if *current != next {
        debug!(from = %*current, to = %next, "Ignoring state change");
    }
}

async fn run_connection(
    url: Url,
    state: Arc<Mutex<ConnectionState>>,
    sink: Arc<Mutex<Option<WsSink>>>,
    events: mpsc::Sender<ChatEvent>,
) {
    info!(endpoint = %url, "Connecting to chat endpoint");

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            error!(error = %e, "WebSocket connection failed");
            transition(&state, ConnectionState::Errored).await;
            let _ = events.send(ChatEvent::Error(e.to_string())).await;
            transition(&state, ConnectionState::Closed).await;
            info!("WebSocket connection closed");
            let _ = events.send(ChatEvent::Closed).await;
            return;
        }
    };

    let (write, mut read) = ws_stream.split();
    *sink.lock().await = Some(write);
    transition(&state, ConnectionState::Open).await;
    info!("WebSocket connection established");
    let _ = events.send(ChatEvent::Open).await;

    let mut closing = false;
    loop {
        match read.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                debug!(len = text.len(), "Received chat message");
                if events.send(ChatEvent::Message(text)).await.is_err() {
                    debug!("Event receiver dropped, stopping reader");
                    break;
                }
            }
            Some(Ok(WsMessage::Close(frame))) => {
                debug!(?frame, "Close frame received");
                closing = true;
                // The close reply is queued by tungstenite; push it out before
                // reading on until the peer drops the socket.
                if let Some(write) = sink.lock().await.as_mut() {
                    if let Err(e) = write.flush().await {
                        debug!(error = %e, "Failed to flush close reply");
                    }
                }
            }
            // Pongs are queued by tungstenite; binary frames carry nothing for us.
            Some(Ok(_)) => {}
            Some(Err(e)) if closing => {
                debug!(error = %e, "Socket ended after close handshake");
                break;
            }
            Some(Err(e)) => {
                error!(error = %e, "WebSocket error");
                transition(&state, ConnectionState::Errored).await;
                let _ = events.send(ChatEvent::Error(e.to_string())).await;
                break;
            }
            None => break,
        }
    }

    *sink.lock().await = None;
    transition(&state, ConnectionState::Closed).await;
    info!("WebSocket connection closed");
    let _ = events.send(ChatEvent::Closed).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    async fn next_event(rx: &mut mpsc::Receiver<ChatEvent>) -> ChatEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for chat event")
            .expect("event channel closed")
    }

    #[test]
    fn test_rejects_malformed_endpoint() {
        // Validation happens before anything is spawned, so no runtime is needed.
        assert!(matches!(
            ChatClient::open("not a url", ClientId::generate(), 8),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ChatClient::open("https://cyb3ria.xyz/api/ws", ClientId::generate(), 8),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_with_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            ws.send(WsMessage::Text("alice: hello".to_string())).await.unwrap();
            let received = loop {
                match ws.next().await {
                    Some(Ok(WsMessage::Text(text))) => break text,
                    Some(Ok(_)) => continue,
                    other => panic!("unexpected frame: {:?}", other),
                }
            };
            ws.close(None).await.unwrap();
            received
        });

        let client_id = ClientId::from("abc-123".to_string());
        let (client, mut events) =
            ChatClient::open(&format!("ws://{}/api/ws", addr), client_id, 8).unwrap();

        assert_eq!(next_event(&mut events).await, ChatEvent::Open);
        assert_eq!(client.state().await, ConnectionState::Open);
        assert_eq!(
            next_event(&mut events).await,
            ChatEvent::Message("alice: hello".to_string())
        );

        client.submit("hi").await.unwrap();
        let received = server.await.unwrap();
        assert_eq!(received, r#"{"client_id":"abc-123","message":"hi"}"#);

        assert_eq!(next_event(&mut events).await, ChatEvent::Closed);
        assert_eq!(client.state().await, ConnectionState::Closed);

        let err = client.submit("too late").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_reports_error_then_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (client, mut events) =
            ChatClient::open(&format!("ws://{}/api/ws", addr), ClientId::generate(), 8).unwrap();

        assert!(matches!(next_event(&mut events).await, ChatEvent::Error(_)));
        assert_eq!(next_event(&mut events).await, ChatEvent::Closed);
        assert_eq!(client.state().await, ConnectionState::Closed);
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_submit_while_connecting_fails() {
        // Accepts at the TCP level but never completes the handshake.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (client, _events) =
            ChatClient::open(&format!("ws://{}/api/ws", addr), ClientId::generate(), 8).unwrap();

        assert_eq!(client.state().await, ConnectionState::Connecting);
        let err = client.submit("hi").await.unwrap_err();
        assert!(matches!(err, Error::Transport(ref m) if m == "connection is not open"));
        drop(listener);
    }

    #[tokio::test]
    async fn test_server_close_is_acknowledged() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            ws.close(None).await.unwrap();
            ws.next().await
        });

        let (client, mut events) =
            ChatClient::open(&format!("ws://{}/", addr), ClientId::generate(), 8).unwrap();
        assert_eq!(next_event(&mut events).await, ChatEvent::Open);

        let reply = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server never saw a close reply")
            .unwrap();
        assert!(matches!(reply, Some(Ok(WsMessage::Close(_)))), "got {:?}", reply);

        assert_eq!(next_event(&mut events).await, ChatEvent::Closed);
        assert_eq!(client.state().await, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_dropped_socket_reports_error_then_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = accept_async(tcp).await.unwrap();
            drop(ws);
        });

        let (client, mut events) =
            ChatClient::open(&format!("ws://{}/", addr), ClientId::generate(), 8).unwrap();

        assert_eq!(next_event(&mut events).await, ChatEvent::Open);
        assert!(matches!(next_event(&mut events).await, ChatEvent::Error(_)));
        assert_eq!(next_event(&mut events).await, ChatEvent::Closed);
        assert_eq!(client.state().await, ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_send_failure_marks_errored() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Holds the socket without reading, so the client's close goes unanswered.
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let _ws = accept_async(tcp).await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let (client, mut events) =
            ChatClient::open(&format!("ws://{}/", addr), ClientId::generate(), 8).unwrap();
        assert_eq!(next_event(&mut events).await, ChatEvent::Open);

        client.close().await.unwrap();
        assert_eq!(client.state().await, ConnectionState::Open);

        let err = client.submit("after close").await.unwrap_err();
        assert!(matches!(err, Error::Transport(ref m) if m.starts_with("Failed to send message")));
        assert_eq!(client.state().await, ConnectionState::Errored);
    }

    #[tokio::test]
    async fn test_client_close_ends_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            // Drain until the client's close frame has been answered.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (client, mut events) =
            ChatClient::open(&format!("ws://{}/", addr), ClientId::generate(), 8).unwrap();
        assert_eq!(next_event(&mut events).await, ChatEvent::Open);

        client.close().await.unwrap();
        assert_eq!(next_event(&mut events).await, ChatEvent::Closed);
        assert_eq!(client.state().await, ConnectionState::Closed);
    }
}
