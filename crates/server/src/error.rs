//! Bridge error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Failed to launch engine '{path}': {source}")]
    Launch {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine {0} pipe was not captured")]
    Pipe(&'static str),

    #[error("Engine closed its {stream}")]
    Closed { stream: &'static str },

    #[error("Engine {stream} failed: {source}")]
    Io {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("WebSocket error: {0}")]
    Socket(#[from] axum::Error),

    #[error("WebSocket closed by client")]
    SocketClosed,

    #[error("Endpoint already started")]
    AlreadyStarted,
}
