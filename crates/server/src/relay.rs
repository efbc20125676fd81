//! Duplex relay between two endpoints.
//!
//! An endpoint hands the relay a [`Wire`]: a source of outgoing messages, a
//! sink for incoming ones and a failure signal. The relay copies messages
//! across in both directions until either side fails, then terminates both.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::BridgeError;

/// Relay-facing half of an endpoint.
pub struct Wire {
    pub output: mpsc::Receiver<String>,
    pub input: mpsc::Sender<String>,
    pub err: mpsc::Receiver<BridgeError>,
}

/// Task-facing half of an endpoint, the counterpart of [`Wire`].
pub struct Plug {
    pub output: mpsc::Sender<String>,
    pub input: mpsc::Receiver<String>,
    pub err: mpsc::Sender<BridgeError>,
}

pub fn wire(capacity: usize) -> (Wire, Plug) {
    let (output_tx, output_rx) = mpsc::channel(capacity);
    let (input_tx, input_rx) = mpsc::channel(capacity);
    // Only the first failure matters
    let (err_tx, err_rx) = mpsc::channel(1);
    (
        Wire {
            output: output_rx,
            input: input_tx,
            err: err_rx,
        },
        Plug {
            output: output_tx,
            input: input_rx,
            err: err_tx,
        },
    )
}

/// Raise a failure without waiting. A failure already pending wins.
pub fn signal(err: &mpsc::Sender<BridgeError>, e: BridgeError) {
    if let Err(mpsc::error::TrySendError::Full(e)) = err.try_send(e) {
        debug!("Dropping secondary failure: {e}");
    }
}

pub trait Endpoint: Send {
    /// Spawn the endpoint's tasks and hand out its wire.
    fn start(&mut self) -> Result<Wire, BridgeError>;

    fn terminate(&mut self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Why a relay session ended. `cause` is `None` when a side simply stopped
/// producing or accepting messages.
#[derive(Debug)]
pub struct Shutdown {
    pub side: Side,
    pub cause: Option<BridgeError>,
}

impl Shutdown {
    fn new(side: Side, cause: Option<BridgeError>) -> Self {
        Self { side, cause }
    }
}

/// Connect `a` and `b` until one of them fails. Both are terminated before
/// returning. If `b` fails to start, `a` is terminated and the error returned.
pub async fn relay<A: Endpoint, B: Endpoint>(a: &mut A, b: &mut B) -> Result<Shutdown, BridgeError> {
    let mut wa = a.start()?;
    let mut wb = match b.start() {
        Ok(wire) => wire,
        Err(e) => {
            a.terminate().await;
            return Err(e);
        }
    };

    let shutdown = loop {
        tokio::select! {
            msg = wa.output.recv() => {
                let Some(msg) = msg else { break Shutdown::new(Side::A, None) };
                if wb.input.send(msg).await.is_err() {
                    break Shutdown::new(Side::B, None);
                }
            }
            msg = wb.output.recv() => {
                let Some(msg) = msg else { break Shutdown::new(Side::B, None) };
                if wa.input.send(msg).await.is_err() {
                    break Shutdown::new(Side::A, None);
                }
            }
            Some(e) = wa.err.recv() => break Shutdown::new(Side::A, Some(e)),
            Some(e) = wb.err.recv() => break Shutdown::new(Side::B, Some(e)),
        }
    };

    a.terminate().await;
    b.terminate().await;
    Ok(shutdown)
}
