//! Gateway - TCP listener that accepts JSON-lines bridge clients.
//!
//! The Gateway binds a socket and spawns a Connection task for each
//! incoming client. All connections share one [`Session`]: the dispatcher,
//! the application lifecycle and the event fan-out.

use super::frame::{ClientFrame, ServerFrame};
use crate::bridge::{BridgeDispatcher, BridgeEvent, EventSink};
use crate::config::AppConfig;
use crate::network::Connection;
use crate::security::{ContextPolicy, TokenAuthority};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Event sink that fans events out to every connected client.
///
/// Sending never blocks; a client that falls more than the channel
/// capacity behind loses the oldest events.
#[derive(Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<BridgeEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastEventSink {
    fn dispatch_event(&self, event: &str, properties: Map<String, Value>) {
        let event = BridgeEvent {
            event: event.to_string(),
            properties,
        };
        if self.tx.send(event).is_err() {
            debug!("No gateway clients subscribed; event dropped");
        }
    }
}

/// State shared by all gateway connections.
pub struct Session {
    dispatcher: Arc<BridgeDispatcher>,
    tokens: Arc<TokenAuthority>,
    policy: Arc<ContextPolicy>,
    apps: Vec<AppConfig>,
    events: BroadcastEventSink,
}

impl Session {
    pub fn new(
        dispatcher: Arc<BridgeDispatcher>,
        tokens: Arc<TokenAuthority>,
        policy: Arc<ContextPolicy>,
        apps: Vec<AppConfig>,
        events: BroadcastEventSink,
    ) -> Self {
        Self {
            dispatcher,
            tokens,
            policy,
            apps,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Handle one client frame and produce its reply.
    pub fn handle(&self, frame: ClientFrame) -> ServerFrame {
        match frame {
            ClientFrame::Launch { app } => self.launch(app),
            ClientFrame::Stop { app } => {
                self.policy.stop(app);
                ServerFrame::Stopped { app_id: app }
            }
            ClientFrame::Request {
                id,
                method,
                token,
                params,
            } => ServerFrame::Response {
                id,
                response: self.dispatcher.request(&method, &token, &params),
            },
        }
    }

    fn launch(&self, app_id: u32) -> ServerFrame {
        let Some(app) = self.apps.iter().find(|a| a.app_id == app_id) else {
            warn!(app_id, "Launch of unknown application refused");
            return ServerFrame::error(format!("unknown application {app_id}"));
        };
        if !self.policy.launch(app_id) {
            return ServerFrame::error(format!("application {app_id} is not registered"));
        }
        let token = self.tokens.mint(app_id, &app.uri(), &app.origin);
        ServerFrame::Launched { app_id, token }
    }
}

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    session: Arc<Session>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, session: Arc<Session>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Gateway listener bound");
        Ok(Self { listener, session })
    }

    /// Run the gateway, accepting connections until the task is dropped.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let id = Uuid::new_v4();
                    info!(%id, %addr, "Connection accepted");
                    let connection = Connection::new(id, stream, addr, Arc::clone(&self.session));

                    tokio::spawn(async move {
                        crate::metrics::client_connected();
                        if let Err(e) = connection.run().await {
                            error!(%id, %addr, error = %e, "Connection error");
                        }
                        crate::metrics::client_disconnected();
                        info!(%id, %addr, "Connection closed");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Accept failed");
                }
            }
        }
    }
}
