/*!
 # gst-switch harness

 A Rust library for launching and supervising the `gst-switch-srv` media
 switching server.

 ## Overview

 The harness provides functionality to:
 - Validate and normalize the server's launch parameters before anything is spawned
 - Construct the server command line deterministically
 - Spawn the server, with output either logged to a file or piped for pattern matching
 - Control the process lifecycle: liveness poll, graceful terminate, forceful kill
 - Request a gcov coverage-counter flush via a diagnostic signal

 ## Basic Usage

 ```no_run
 use gst_switch_harness::{ServerConfig, ServerProcess, Result};
 use std::time::Duration;

 #[tokio::main]
 async fn main() -> Result<()> {
     // Validation happens here, before any OS resource is touched
     let config = ServerConfig::builder()
         .video_port(3000)
         .audio_port(4000)
         .controller_address("tcp:host=::,port=5000")
         .record_file(true)
         .log_to_file(false)
         .build()?;

     let mut server = ServerProcess::new(config);
     server.run("").await?;

     // Wait for the server to announce readiness on its output
     server
         .wait_for_output("tcp=", Duration::from_secs(5), 1)
         .await?;

     assert!(server.is_alive()?);
     server.terminate(false).await?;

     Ok(())
 }
 ```

 ## Features

 - **Validating configuration**: every launch parameter is checked at build
   time, and the resulting configuration is immutable
 - **Single-child supervision**: one supervised server per instance, with a
   strict NotStarted / Running / Ended state machine
 - **Signal-based control**: SIGTERM, SIGKILL, and SIGUSR1 delivery to the
   recorded pid
 - **Output matching**: bounded waits for patterns in the server's output

 ## License

 This project is licensed under the MIT license.
*/

pub mod config;
pub mod error;
pub mod server;

pub use config::{RecordFile, ServerConfig, ServerConfigBuilder};
pub use error::{Error, Result};
pub use server::{ServerProcess, ServerState};
