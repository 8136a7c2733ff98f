//! Launches a gst-switch-srv instance, waits for its controller banner, and
//! terminates it. Run with RUST_LOG=debug for the harness's tracing output.

use gst_switch_harness::{Result, ServerConfig, ServerProcess};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::builder()
        .video_port(3000)
        .audio_port(4000)
        .controller_address("tcp:host=::,port=5000")
        .log_to_file(false)
        .build()?;

    let mut server = ServerProcess::new(config);
    server.run("").await?;
    println!("server running, pid {:?}", server.pid());

    server
        .wait_for_output("tcp:", Duration::from_secs(5), 1)
        .await?;
    println!("controller is listening");

    server.terminate(false).await?;
    Ok(())
}
