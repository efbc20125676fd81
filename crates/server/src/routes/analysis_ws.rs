//! WebSocket analysis route: one engine process per connection, relayed
//! until either side goes away.

use axum::{
    extract::ws::{WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    Extension,
};
use tracing::{error, info};

use crate::config::Config;
use crate::engine::EngineEndpoint;
use crate::relay::{relay, Side};
use crate::socket::SocketEndpoint;

pub async fn ws_handler(ws: WebSocketUpgrade, Extension(config): Extension<Config>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, config))
}

async fn handle_socket(socket: WebSocket, config: Config) {
    let mut client = SocketEndpoint::new(socket, config.channel_capacity);
    let mut engine = EngineEndpoint::from_config(&config);

    match relay(&mut client, &mut engine).await {
        Ok(shutdown) => {
            let side = match shutdown.side {
                Side::A => "client",
                Side::B => "engine",
            };
            match shutdown.cause {
                Some(cause) => info!(side, "Session ended: {cause}"),
                None => info!(side, "Session ended"),
            }
        }
        Err(e) => error!(engine = %config.engine_path, "Failed to start session: {e}"),
    }
}
