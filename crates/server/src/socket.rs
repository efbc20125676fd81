//! WebSocket endpoint. Text frames from the client are engine commands;
//! every message sent back is one text frame.

use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::BridgeError;
use crate::relay::{signal, wire, Endpoint, Plug, Wire};

pub struct SocketEndpoint {
    socket: Option<WebSocket>,
    capacity: usize,
    shutdown: Option<oneshot::Sender<()>>,
    writer: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
}

impl SocketEndpoint {
    pub fn new(socket: WebSocket, capacity: usize) -> Self {
        Self {
            socket: Some(socket),
            capacity,
            shutdown: None,
            writer: None,
            reader: None,
        }
    }
}

impl Endpoint for SocketEndpoint {
    fn start(&mut self) -> Result<Wire, BridgeError> {
        let socket = self.socket.take().ok_or(BridgeError::AlreadyStarted)?;
        let (sink, stream) = socket.split();
        let (wire, plug) = wire(self.capacity);
        let Plug { output, input, err } = plug;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        self.reader = Some(tokio::spawn(read_socket(stream, output, err.clone())));
        self.writer = Some(tokio::spawn(write_socket(sink, input, shutdown_rx, err)));
        self.shutdown = Some(shutdown_tx);
        Ok(wire)
    }

    /// Send a close frame, then stop both tasks.
    async fn terminate(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(writer) = self.writer.take() {
            let _ = writer.await;
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

async fn read_socket(
    mut stream: SplitStream<WebSocket>,
    output: mpsc::Sender<String>,
    err: mpsc::Sender<BridgeError>,
) {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                debug!(cmd = %text, "client >");
                if output.send(text.to_string()).await.is_err() {
                    return;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                signal(&err, BridgeError::SocketClosed);
                return;
            }
            // Binary, ping and pong frames carry no commands
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                signal(&err, BridgeError::Socket(e));
                return;
            }
        }
    }
}

async fn write_socket(
    mut sink: SplitSink<WebSocket, Message>,
    mut input: mpsc::Receiver<String>,
    mut shutdown: oneshot::Receiver<()>,
    err: mpsc::Sender<BridgeError>,
) {
    loop {
        let msg = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            msg = input.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };

        if let Err(e) = sink.send(Message::Text(msg.into())).await {
            signal(&err, BridgeError::Socket(e));
            return;
        }
    }
    let _ = sink.send(Message::Close(None)).await;
}
