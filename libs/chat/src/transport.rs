use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use metrics::counter;
use tokio::net::TcpStream;
use tokio::sync::{RwLock, mpsc, watch};
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

use crewdesk_client::store::SharedCredentialStore;
use crewdesk_core::{AiMessage, InboundFrame, OutboundFrame};

use crate::backoff::ReconnectPolicy;
use crate::conversation::ConversationLog;
use crate::machine::{ConnectionState, TransportEvent};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport configuration. `ws_base` is the scheme+authority of the chat
/// endpoint, e.g. `ws://127.0.0.1:8990`; the `/ws/chat` path is appended.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub ws_base: String,
    pub policy: ReconnectPolicy,
}

impl ChatConfig {
    pub fn new(ws_base: impl Into<String>) -> Self {
        Self {
            ws_base: ws_base.into(),
            policy: ReconnectPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }
}

enum Command {
    Send(String),
    Teardown,
}

/// Host-facing handle to the transport task.
pub struct ChatHandle {
    commands: mpsc::UnboundedSender<Command>,
    connected: watch::Receiver<bool>,
    revision: watch::Receiver<u64>,
    log: Arc<RwLock<ConversationLog>>,
    task: tokio::task::JoinHandle<()>,
}

/// Spawns the transport task and returns its handle. The task connects
/// immediately and keeps reconnecting until [`ChatHandle::close`].
pub fn connect(config: ChatConfig, store: SharedCredentialStore) -> ChatHandle {
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (status_tx, connected) = watch::channel(false);
    let (revision_tx, revision) = watch::channel(0u64);
    let log = Arc::new(RwLock::new(ConversationLog::new()));
    let task = tokio::spawn(run(
        config,
        store,
        command_rx,
        status_tx,
        revision_tx,
        Arc::clone(&log),
    ));
    ChatHandle {
        commands,
        connected,
        revision,
        log,
        task,
    }
}

impl ChatHandle {
    /// Sends a chat message. A send while the channel is down is dropped
    /// silently; watch [`ChatHandle::is_connected`] before assuming delivery.
    pub fn send(&self, text: impl Into<String>) {
        if !self.is_connected() {
            counter!("chat_sends_dropped_total").increment(1);
            debug!("dropping chat send while disconnected");
            return;
        }
        let _ = self.commands.send(Command::Send(text.into()));
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Connection-status channel for hosts that redraw on reconnect.
    pub fn watch_status(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    /// Bumped after every change to the conversation log.
    pub fn watch_revision(&self) -> watch::Receiver<u64> {
        self.revision.clone()
    }

    pub async fn snapshot(&self) -> ConversationLog {
        self.log.read().await.clone()
    }

    pub async fn load_history(&self, history: Vec<AiMessage>) {
        self.log.write().await.load_history(history);
    }

    pub async fn clear(&self) {
        self.log.write().await.clear();
    }

    /// Tears the transport down: cancels any pending reconnect timer, closes
    /// the socket, and stops the task. Idempotent.
    pub fn close(&self) {
        let _ = self.commands.send(Command::Teardown);
    }

    /// Waits for the task to exit after [`ChatHandle::close`].
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

#[derive(Debug, thiserror::Error)]
enum ConnectError {
    #[error("no access token available")]
    MissingToken,
    #[error("credential store failure: {0}")]
    Store(String),
    #[error("handshake failed: {0}")]
    Handshake(#[from] tokio_tungstenite::tungstenite::Error),
}

async fn run(
    config: ChatConfig,
    store: SharedCredentialStore,
    mut commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<bool>,
    revision: watch::Sender<u64>,
    log: Arc<RwLock<ConversationLog>>,
) {
    let mut state = ConnectionState::initial();
    let mut socket: Option<Socket> = None;
    let mut rev: u64 = 0;

    loop {
        state = match state {
            ConnectionState::Connecting { .. } => {
                tokio::select! {
                    outcome = establish(&config, &store) => match outcome {
                        Ok(live) => {
                            debug!("chat socket open");
                            counter!("chat_connects_total").increment(1);
                            socket = Some(live);
                            let _ = status.send(true);
                            state.apply(TransportEvent::Opened)
                        }
                        Err(err) => {
                            debug!(error = %err, "chat handshake failed");
                            state.apply(TransportEvent::HandshakeFailed)
                        }
                    },
                    command = commands.recv() => match command {
                        Some(Command::Teardown) | None => state.apply(TransportEvent::Teardown),
                        Some(Command::Send(_)) => {
                            counter!("chat_sends_dropped_total").increment(1);
                            debug!("dropping chat send while disconnected");
                            state
                        }
                    },
                }
            }
            ConnectionState::Open => {
                let event = match socket.take() {
                    Some(live) => {
                        drive_open(live, &mut commands, &log, &revision, &mut rev).await
                    }
                    None => TransportEvent::ConnectionLost,
                };
                let _ = status.send(false);
                {
                    log.write().await.connection_reset();
                }
                bump(&revision, &mut rev);
                state.apply(event)
            }
            ConnectionState::Retrying { attempt } => {
                let delay = config.policy.delay(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "scheduling chat reconnect");
                counter!("chat_reconnects_scheduled_total").increment(1);
                tokio::select! {
                    _ = sleep(delay) => state.apply(TransportEvent::RetryElapsed),
                    command = commands.recv() => match command {
                        Some(Command::Teardown) | None => state.apply(TransportEvent::Teardown),
                        Some(Command::Send(_)) => {
                            counter!("chat_sends_dropped_total").increment(1);
                            debug!("dropping chat send while disconnected");
                            state
                        }
                    },
                }
            }
            ConnectionState::Closed => break,
        };
    }
    let _ = status.send(false);
    debug!("chat transport stopped");
}

async fn establish(config: &ChatConfig, store: &SharedCredentialStore) -> Result<Socket, ConnectError> {
    let pair = store
        .tokens()
        .await
        .map_err(|err| ConnectError::Store(err.to_string()))?
        .ok_or(ConnectError::MissingToken)?;
    let url = format!(
        "{}/ws/chat?token={}",
        config.ws_base.trim_end_matches('/'),
        pair.access_token
    );
    let (socket, _response) = connect_async(url).await?;
    Ok(socket)
}

/// Pumps an open socket until it drops or the host tears down. Both user
/// sends and inbound frames mutate the log from this task, which is what
/// keeps the append order identical to the real-time interleaving.
async fn drive_open(
    mut socket: Socket,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    log: &Arc<RwLock<ConversationLog>>,
    revision: &watch::Sender<u64>,
    rev: &mut u64,
) -> TransportEvent {
    loop {
        tokio::select! {
            frame = socket.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    let frame = InboundFrame::decode(text.as_str());
                    {
                        log.write().await.apply(frame);
                    }
                    bump(revision, rev);
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    debug!("chat socket closed by peer");
                    return TransportEvent::ConnectionLost;
                }
                Some(Ok(_)) => {} // ping/pong/binary: nothing to dispatch
                Some(Err(err)) => {
                    warn!(error = %err, "chat socket error");
                    let _ = socket.close(None).await;
                    return TransportEvent::ConnectionLost;
                }
            },
            command = commands.recv() => match command {
                Some(Command::Send(content)) => {
                    {
                        log.write().await.push_user(&content);
                    }
                    bump(revision, rev);
                    let payload = match serde_json::to_string(&OutboundFrame { content }) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!(error = %err, "failed to encode outbound frame");
                            continue;
                        }
                    };
                    counter!("chat_sends_total").increment(1);
                    if let Err(err) = socket.send(WsMessage::Text(payload.into())).await {
                        warn!(error = %err, "chat send failed");
                        return TransportEvent::ConnectionLost;
                    }
                }
                Some(Command::Teardown) | None => {
                    let _ = socket.close(None).await;
                    return TransportEvent::Teardown;
                }
            },
        }
    }
}

fn bump(revision: &watch::Sender<u64>, rev: &mut u64) {
    *rev += 1;
    let _ = revision.send(*rev);
}
