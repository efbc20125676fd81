//! Engine endpoint: the engine process plus a task that tracks the analysed
//! position and rewrites info lines into algebraic notation.

use chess_core::AnalysisState;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::config::Config;
use crate::error::BridgeError;
use crate::process::ProcessBridge;
use crate::relay::{signal, wire, Endpoint, Plug, Wire};

pub struct EngineEndpoint {
    process: ProcessBridge,
    capacity: usize,
    talk: Option<JoinHandle<()>>,
}

impl EngineEndpoint {
    pub fn new(process: ProcessBridge, capacity: usize) -> Self {
        Self {
            process,
            capacity,
            talk: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let process = ProcessBridge::new(
            config.engine_path.clone(),
            config.engine_args.clone(),
            config.channel_capacity,
            config.shutdown_grace,
        );
        Self::new(process, config.channel_capacity)
    }
}

impl Endpoint for EngineEndpoint {
    fn start(&mut self) -> Result<Wire, BridgeError> {
        if self.talk.is_some() {
            return Err(BridgeError::AlreadyStarted);
        }
        let process = self.process.start()?;
        let (wire, plug) = wire(self.capacity);
        self.talk = Some(tokio::spawn(talk(plug, process)));
        Ok(wire)
    }

    async fn terminate(&mut self) {
        if let Some(talk) = self.talk.take() {
            talk.abort();
        }
        self.process.terminate().await;
    }
}

/// Commands go to the engine verbatim after updating the analysis state;
/// engine lines are passed, suppressed or rendered according to it.
async fn talk(plug: Plug, process: Wire) {
    let Plug {
        output,
        mut input,
        err,
    } = plug;
    let Wire {
        output: mut lines,
        input: commands,
        err: mut process_err,
    } = process;
    let mut state = AnalysisState::default();

    loop {
        // Lines already read win over the failure that follows them
        tokio::select! {
            biased;
            cmd = input.recv() => {
                let Some(cmd) = cmd else { return };
                if let Err(e) = state.command(&cmd) {
                    warn!(command = %cmd, "Could not follow position: {e}");
                }
                if commands.send(cmd).await.is_err() {
                    return;
                }
            }
            line = lines.recv() => {
                let Some(line) = line else {
                    if let Ok(e) = process_err.try_recv() {
                        signal(&err, e);
                    }
                    return;
                };
                match state.engine_line(&line) {
                    Ok(Some(out)) => {
                        if output.send(out).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(line = %line, "Dropping engine line: {e}"),
                }
            }
            Some(e) = process_err.recv() => {
                signal(&err, e);
                return;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fake_engine(script: &str) -> EngineEndpoint {
        let args = vec!["-c".to_string(), script.to_string()];
        EngineEndpoint::new(
            ProcessBridge::new("sh", args, 16, Duration::from_millis(500)),
            16,
        )
    }

    #[tokio::test]
    async fn test_lines_pass_through_while_idle() {
        let mut engine = EngineEndpoint::new(
            ProcessBridge::new("cat", Vec::new(), 16, Duration::from_millis(500)),
            16,
        );
        let mut wire = engine.start().unwrap();

        wire.input.send("uci".to_string()).await.unwrap();
        assert_eq!(wire.output.recv().await.as_deref(), Some("uci"));
        engine.terminate().await;
    }

    #[tokio::test]
    async fn test_info_lines_rendered_after_go() {
        // Waits for "go", then reports one irrelevant and one scored line
        let mut engine = fake_engine(
            "read cmd; read cmd; \
             echo 'info depth 1 currmove e2e4'; \
             echo 'info depth 1 seldepth 1 multipv 1 score cp 56 nodes 33 pv e2e3 a7a6'; \
             read cmd",
        );
        let mut wire = engine.start().unwrap();

        wire.input.send("position startpos".to_string()).await.unwrap();
        wire.input.send("go depth 1".to_string()).await.unwrap();
        assert_eq!(wire.output.recv().await.as_deref(), Some("0.56 - 1.e3 a6"));
        engine.terminate().await;
    }

    #[tokio::test]
    async fn test_engine_exit_is_reported() {
        let mut engine = fake_engine("echo 'Stockfish 16 by the Stockfish developers'");
        let mut wire = engine.start().unwrap();

        assert_eq!(
            wire.output.recv().await.as_deref(),
            Some("Stockfish 16 by the Stockfish developers")
        );
        assert!(matches!(wire.err.recv().await, Some(BridgeError::Closed { .. })));
        engine.terminate().await;
    }
}
