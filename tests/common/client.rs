//! Test bridge client.
//!
//! Speaks the gateway's JSON-lines protocol and keeps events that arrive
//! while waiting for a response.

use serde_json::{Value, json};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test bridge client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    next_id: u64,
    events: VecDeque<Value>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            next_id: 1,
            events: VecDeque::new(),
        })
    }

    /// Send a raw line.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Write raw bytes, newline included by the caller.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn send(&mut self, frame: Value) -> anyhow::Result<()> {
        self.send_raw(&frame.to_string()).await
    }

    /// Receive a single frame.
    pub async fn recv(&mut self) -> anyhow::Result<Value> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a frame with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Value> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("Connection closed");
        }
        Ok(serde_json::from_str(line.trim_end())?)
    }

    /// Receive the next non-event frame, queueing events seen on the way.
    pub async fn recv_reply(&mut self) -> anyhow::Result<Value> {
        loop {
            let frame = self.recv().await?;
            if frame["type"] == "event" {
                self.events.push_back(frame);
            } else {
                return Ok(frame);
            }
        }
    }

    /// Launch `app` and return its token.
    pub async fn launch(&mut self, app: u32) -> anyhow::Result<Value> {
        self.send(json!({ "type": "launch", "app": app })).await?;
        let reply = self.recv_reply().await?;
        anyhow::ensure!(reply["type"] == "launched", "launch failed: {reply}");
        Ok(reply["token"].clone())
    }

    /// Call a bridge method and return the `response` object.
    pub async fn request(&mut self, method: &str, token: &Value, params: Value) -> anyhow::Result<Value> {
        let id = self.next_id;
        self.next_id += 1;
        self.send(json!({
            "type": "request",
            "id": id,
            "method": method,
            "token": token,
            "params": params,
        }))
        .await?;
        let reply = self.recv_reply().await?;
        anyhow::ensure!(reply["type"] == "response", "unexpected reply: {reply}");
        anyhow::ensure!(reply["id"] == id, "reply for another request: {reply}");
        Ok(reply["response"].clone())
    }

    /// Next event, whether already queued or still in flight.
    pub async fn next_event(&mut self) -> anyhow::Result<Value> {
        if let Some(event) = self.events.pop_front() {
            return Ok(event);
        }
        let frame = self.recv().await?;
        anyhow::ensure!(frame["type"] == "event", "expected event, got {frame}");
        Ok(frame)
    }

    /// Wait for an event named `name`, skipping others.
    pub async fn expect_event(&mut self, name: &str) -> anyhow::Result<Value> {
        loop {
            let event = self.next_event().await?;
            if event["event"] == name {
                return Ok(event);
            }
        }
    }
}
