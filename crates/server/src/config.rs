use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub engine_path: String,
    pub engine_args: Vec<String>,
    pub static_dir: String,
    pub channel_capacity: usize,
    pub shutdown_grace: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6400),
            engine_path: env::var("ENGINE_PATH").unwrap_or_else(|_| "stockfish".to_string()),
            engine_args: env::var("ENGINE_ARGS")
                .map(|v| v.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| ".".to_string()),
            channel_capacity: env::var("CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(64),
            shutdown_grace: Duration::from_millis(
                env::var("ENGINE_SHUTDOWN_GRACE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1000),
            ),
        }
    }
}
