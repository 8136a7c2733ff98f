/// Server supervision module for the gst-switch harness.
///
/// This module owns the lifecycle and process management of the supervised
/// `gst-switch-srv` instance: spawning, liveness polling, signal delivery,
/// and pattern matching on the server's output.
/// The lifecycle operations are instrumented with `tracing` spans.
///
/// # Components
///
/// * `process` - The `ServerProcess` supervisor and its state machine
/// * `monitor` - Pattern matching on the server's stdout/stderr
///
/// # Examples
///
/// Launching and terminating a server:
///
/// ```no_run
/// use gst_switch_harness::config::ServerConfig;
/// use gst_switch_harness::server::{ServerProcess, ServerState};
///
/// #[tokio::main]
/// async fn main() -> gst_switch_harness::Result<()> {
///     let config = ServerConfig::builder()
///         .video_port(3000)
///         .audio_port(4000)
///         .build()?;
///
///     let mut server = ServerProcess::new(config);
///     assert_eq!(server.state(), ServerState::NotStarted);
///
///     server.run("").await?;
///     assert!(server.is_alive()?);
///
///     server.terminate(false).await?;
///     assert_eq!(server.state(), ServerState::Ended);
///     Ok(())
/// }
/// ```
pub mod monitor;
mod process;

pub use monitor::OutputMonitor;
pub use process::{ServerProcess, ServerState, SERVER_BINARY, SERVER_LOG_FILE};
