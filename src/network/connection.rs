//! Connection - Handles an individual gateway client.
//!
//! Each Connection runs in its own Tokio task. One `tokio::select!` loop
//! multiplexes inbound frames with the shared event broadcast, so a reply
//! is always written before any event its request caused.

use super::frame::{ClientFrame, ServerFrame};
use super::gateway::Session;
use crate::telemetry::spans;
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{Instrument, debug, warn};
use uuid::Uuid;

/// Longest accepted frame, in bytes.
const MAX_FRAME_LENGTH: usize = 64 * 1024;

/// A gateway client connection handler.
pub struct Connection {
    id: Uuid,
    stream: TcpStream,
    addr: SocketAddr,
    session: Arc<Session>,
}

impl Connection {
    pub fn new(id: Uuid, stream: TcpStream, addr: SocketAddr, session: Arc<Session>) -> Self {
        Self {
            id,
            stream,
            addr,
            session,
        }
    }

    /// Run the connection until the client disconnects.
    pub async fn run(self) -> anyhow::Result<()> {
        let span = spans::connection(&self.id.to_string(), &self.addr.to_string());
        self.serve().instrument(span).await
    }

    async fn serve(self) -> anyhow::Result<()> {
        let mut framed = Framed::new(self.stream, LinesCodec::new_with_max_length(MAX_FRAME_LENGTH));
        let mut events = self.session.subscribe();
        let mut resync = false;

        loop {
            tokio::select! {
                line = framed.next() => {
                    let line = match line {
                        Some(Ok(line)) => line,
                        Some(Err(e)) if is_malformed_line(&e) => {
                            debug!(error = %e, "Unreadable frame");
                            framed.send(ServerFrame::error(format!("malformed frame: {e}")).to_line()?).await?;
                            // Framed yields a single None after a decode error before reading on.
                            resync = true;
                            continue;
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None if resync => {
                            resync = false;
                            continue;
                        }
                        None => {
                            debug!("Client closed the stream");
                            break;
                        }
                    };
                    resync = false;
                    if line.trim().is_empty() {
                        continue;
                    }
                    let reply = match serde_json::from_str::<ClientFrame>(&line) {
                        Ok(frame) => self.session.handle(frame),
                        Err(e) => {
                            debug!(error = %e, "Malformed frame");
                            ServerFrame::error(format!("malformed frame: {e}"))
                        }
                    };
                    framed.send(reply.to_line()?).await?;
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        framed.send(ServerFrame::Event(event).to_line()?).await?;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Client lagging; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        Ok(())
    }
}

/// Whether a codec error only spoils the current line.
///
/// Oversized lines are skipped up to the next newline and invalid UTF-8 is
/// already consumed, so the stream stays usable after either.
fn is_malformed_line(e: &LinesCodecError) -> bool {
    match e {
        LinesCodecError::MaxLineLengthExceeded => true,
        LinesCodecError::Io(e) => e.kind() == io::ErrorKind::InvalidData,
    }
}
