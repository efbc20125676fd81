//! External engine process with line-oriented pipes (async I/O)

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::BridgeError;
use crate::relay::{signal, wire, Endpoint, Plug, Wire};

/// Owns one engine subprocess. Lines on stdout become wire output, wire input
/// is written to stdin one line per message, stderr is only logged. A read
/// failure on either output pipe ends the session.
pub struct ProcessBridge {
    path: String,
    args: Vec<String>,
    capacity: usize,
    grace: Duration,
    child: Option<Child>,
    shutdown: Option<oneshot::Sender<()>>,
    writer: Option<JoinHandle<()>>,
    readers: Vec<JoinHandle<()>>,
}

impl ProcessBridge {
    pub fn new(path: impl Into<String>, args: Vec<String>, capacity: usize, grace: Duration) -> Self {
        Self {
            path: path.into(),
            args,
            capacity,
            grace,
            child: None,
            shutdown: None,
            writer: None,
            readers: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    /// Spawn the process and its pipe tasks.
    pub fn start(&mut self) -> Result<Wire, BridgeError> {
        if self.child.is_some() {
            return Err(BridgeError::AlreadyStarted);
        }

        let child = Command::new(&self.path)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BridgeError::Launch {
                path: self.path.clone(),
                source,
            })?;
        info!(engine = %self.path, pid = ?child.id(), "Engine started");

        // Held by self from here on, so a missing pipe still gets the child killed
        let child = self.child.insert(child);
        let stdin = child.stdin.take().ok_or(BridgeError::Pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(BridgeError::Pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(BridgeError::Pipe("stderr"))?;

        let (wire, plug) = wire(self.capacity);
        let Plug { output, input, err } = plug;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        self.readers.push(tokio::spawn(read_stdout(stdout, output, err.clone())));
        self.readers.push(tokio::spawn(drain_stderr(stderr, err.clone())));
        self.writer = Some(tokio::spawn(write_stdin(stdin, input, shutdown_rx, err)));
        self.shutdown = Some(shutdown_tx);

        Ok(wire)
    }

    /// Close stdin, interrupt the engine and wait for it to exit. The engine
    /// is killed when the interrupt cannot be delivered, or when it is still
    /// running after the grace period.
    pub async fn terminate(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(writer) = self.writer.take() {
            let _ = writer.await;
        }

        if let Some(mut child) = self.child.take() {
            if let Err(e) = interrupt(&child) {
                warn!(engine = %self.path, "Failed to interrupt engine, killing: {e}");
                if let Err(e) = child.start_kill() {
                    warn!(engine = %self.path, "Failed to kill engine: {e}");
                }
            }

            match timeout(self.grace, child.wait()).await {
                Ok(Ok(status)) => info!(engine = %self.path, %status, "Engine exited"),
                Ok(Err(e)) => warn!(engine = %self.path, "Failed to wait for engine: {e}"),
                Err(_) => {
                    warn!(engine = %self.path, "Engine ignored interrupt, killing");
                    if let Err(e) = child.kill().await {
                        warn!(engine = %self.path, "Failed to kill engine: {e}");
                    }
                }
            }
        }

        for reader in self.readers.drain(..) {
            reader.abort();
        }
    }
}

/// Send SIGINT to a child that has not been reaped yet.
#[cfg(unix)]
fn interrupt(child: &Child) -> std::io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    // No id means the exit status was already collected
    let Some(id) = child.id() else {
        return Ok(());
    };
    let pid = i32::try_from(id).map_err(|_| std::io::Error::other(format!("pid {id} out of range")))?;
    kill(Pid::from_raw(pid), Signal::SIGINT).map_err(std::io::Error::from)
}

#[cfg(not(unix))]
fn interrupt(_child: &Child) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "no interrupt signal on this platform",
    ))
}

impl Endpoint for ProcessBridge {
    fn start(&mut self) -> Result<Wire, BridgeError> {
        ProcessBridge::start(self)
    }

    async fn terminate(&mut self) {
        ProcessBridge::terminate(self).await
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        if let Some(child) = &mut self.child {
            let _ = child.start_kill();
        }
    }
}

async fn read_stdout<R: AsyncRead + Unpin>(
    stdout: R,
    output: mpsc::Sender<String>,
    err: mpsc::Sender<BridgeError>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                debug!(line = %line, "engine >");
                if output.send(line).await.is_err() {
                    return;
                }
            }
            Ok(None) => {
                signal(&err, BridgeError::Closed { stream: "stdout" });
                return;
            }
            Err(source) => {
                signal(&err, BridgeError::Io { stream: "stdout", source });
                return;
            }
        }
    }
}

async fn drain_stderr<R: AsyncRead + Unpin>(stderr: R, err: mpsc::Sender<BridgeError>) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => debug!(line = %line, "engine stderr"),
            Ok(None) => return,
            Err(source) => {
                signal(&err, BridgeError::Io { stream: "stderr", source });
                return;
            }
        }
    }
}

async fn write_stdin(
    mut stdin: ChildStdin,
    mut input: mpsc::Receiver<String>,
    mut shutdown: oneshot::Receiver<()>,
    err: mpsc::Sender<BridgeError>,
) {
    loop {
        let cmd = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            cmd = input.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
        };

        debug!(cmd = %cmd, "engine <");
        if let Err(source) = write_line(&mut stdin, &cmd).await {
            signal(&err, BridgeError::Io { stream: "stdin", source });
            break;
        }
    }
    // Dropping stdin closes the pipe
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> std::io::Result<()> {
    stdin.write_all(format!("{line}\n").as_bytes()).await?;
    stdin.flush().await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn bridge(path: &str, args: &[&str]) -> ProcessBridge {
        let args = args.iter().map(|a| a.to_string()).collect();
        ProcessBridge::new(path, args, 16, Duration::from_millis(500))
    }

    #[tokio::test]
    async fn test_echo_round_trip() {
        let mut cat = bridge("cat", &[]);
        let mut wire = cat.start().unwrap();
        assert!(cat.id().is_some());

        wire.input.send("uci".to_string()).await.unwrap();
        wire.input.send("isready".to_string()).await.unwrap();
        assert_eq!(wire.output.recv().await.as_deref(), Some("uci"));
        assert_eq!(wire.output.recv().await.as_deref(), Some("isready"));

        cat.terminate().await;
        assert!(cat.id().is_none());
    }

    #[tokio::test]
    async fn test_exit_signals_closed() {
        let mut engine = bridge("sh", &["-c", "echo 'id name Fake'"]);
        let mut wire = engine.start().unwrap();

        assert_eq!(wire.output.recv().await.as_deref(), Some("id name Fake"));
        assert!(matches!(
            wire.err.recv().await,
            Some(BridgeError::Closed { stream: "stdout" })
        ));
        engine.terminate().await;
    }

    #[tokio::test]
    async fn test_stderr_is_not_forwarded() {
        let mut engine = bridge("sh", &["-c", "echo noise >&2; echo readyok"]);
        let mut wire = engine.start().unwrap();
        assert_eq!(wire.output.recv().await.as_deref(), Some("readyok"));
        engine.terminate().await;
    }

    #[tokio::test]
    async fn test_terminate_interrupts_engine() {
        let marker = std::env::temp_dir().join(format!(
            "engine-int-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        // Keeps running after stdin closes, exits only on SIGINT
        let script = format!(
            "trap 'touch {}; exit 0' INT; echo ready; while :; do sleep 0.05; done",
            marker.display()
        );
        let mut engine = bridge("sh", &["-c", &script]);
        let mut wire = engine.start().unwrap();
        assert_eq!(wire.output.recv().await.as_deref(), Some("ready"));

        engine.terminate().await;
        assert!(marker.exists());
        std::fs::remove_file(&marker).unwrap();
    }

    #[tokio::test]
    async fn test_stubborn_engine_is_killed() {
        // Ignores both stdin EOF and SIGINT
        let mut engine = bridge("sh", &["-c", "trap '' INT; echo ready; while :; do sleep 0.05; done"]);
        let mut wire = engine.start().unwrap();
        assert_eq!(wire.output.recv().await.as_deref(), Some("ready"));

        let started = std::time::Instant::now();
        engine.terminate().await;
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(engine.id().is_none());
    }

    /// Reader whose every poll fails.
    struct BrokenPipe;

    impl AsyncRead for BrokenPipe {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "pipe gone",
            )))
        }
    }

    #[tokio::test]
    async fn test_stderr_read_error_is_fatal() {
        let (mut wire, plug) = wire(4);
        drain_stderr(BrokenPipe, plug.err).await;
        assert!(matches!(
            wire.err.recv().await,
            Some(BridgeError::Io { stream: "stderr", .. })
        ));
    }

    #[tokio::test]
    async fn test_stderr_eof_is_quiet() {
        let (mut wire, plug) = wire(4);
        drain_stderr(&b"info string warming up\n"[..], plug.err).await;
        assert!(wire.err.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stdout_read_error_is_fatal() {
        let (mut wire, plug) = wire(4);
        read_stdout(BrokenPipe, plug.output, plug.err).await;
        assert!(matches!(
            wire.err.recv().await,
            Some(BridgeError::Io { stream: "stdout", .. })
        ));
        assert!(wire.output.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let mut engine = bridge("/nonexistent/engine", &[]);
        assert!(matches!(engine.start(), Err(BridgeError::Launch { .. })));
    }

    #[tokio::test]
    async fn test_double_start() {
        let mut cat = bridge("cat", &[]);
        let _wire = cat.start().unwrap();
        assert!(matches!(cat.start(), Err(BridgeError::AlreadyStarted)));
        cat.terminate().await;
    }
}
