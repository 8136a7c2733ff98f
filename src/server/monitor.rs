use crate::error::{Error, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Watches a server process's output streams for pattern matches.
///
/// `OutputMonitor` takes ownership of the child's stdout and stderr pipes and
/// accumulates their lines in a shared buffer via background tasks. Callers
/// block on [`OutputMonitor::wait_for_output`] until a pattern has appeared
/// the requested number of times or a timeout elapses. The monitor never
/// interprets the lines beyond substring containment.
pub struct OutputMonitor {
    /// Lines observed so far, both streams interleaved in arrival order.
    lines: Arc<Mutex<Vec<String>>>,
    /// Woken whenever a new line lands in the buffer.
    notify: Arc<Notify>,
    /// Background reader tasks, aborted on drop.
    reader_tasks: Vec<JoinHandle<()>>,
}

impl OutputMonitor {
    /// Attaches a monitor to the child's piped output streams.
    ///
    /// Spawns one reader task per stream. The tasks run until EOF, which the
    /// pipes reach when the child exits.
    pub fn attach(stdout: ChildStdout, stderr: ChildStderr) -> Self {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let notify = Arc::new(Notify::new());

        let reader_tasks = vec![
            spawn_reader(stdout, Arc::clone(&lines), Arc::clone(&notify)),
            spawn_reader(stderr, Arc::clone(&lines), Arc::clone(&notify)),
        ];

        Self {
            lines,
            notify,
            reader_tasks,
        }
    }

    /// Blocks until `count` lines containing `pattern` have been observed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the matches do not arrive within
    /// `timeout`, and [`Error::Process`] if the line buffer is unusable.
    pub async fn wait_for_output(
        &self,
        pattern: &str,
        timeout: Duration,
        count: usize,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            // Register for wakeup before counting so a line that lands
            // between the check and the await is not missed.
            let notified = self.notify.notified();

            let matches = self
                .lines
                .lock()
                .map_err(|_| Error::Process("failed to lock output buffer".to_string()))?
                .iter()
                .filter(|line| line.contains(pattern))
                .count();

            if matches >= count {
                tracing::debug!(pattern, matches, "Pattern count reached");
                return Ok(());
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Err(Error::Timeout(format!(
                    "saw {} of {} occurrences of '{}' before timeout",
                    matches, count, pattern
                )));
            }
        }
    }
}

impl Drop for OutputMonitor {
    fn drop(&mut self) {
        for task in &self.reader_tasks {
            task.abort();
        }
    }
}

fn spawn_reader<R>(
    stream: R,
    lines: Arc<Mutex<Vec<String>>>,
    notify: Arc<Notify>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream).lines();
        loop {
            match reader.next_line().await {
                Ok(Some(line)) => {
                    tracing::trace!(%line, "Server output");
                    if let Ok(mut buffer) = lines.lock() {
                        buffer.push(line);
                    }
                    notify.notify_waiters();
                }
                // EOF: the child closed its end of the pipe
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Error reading server output");
                    break;
                }
            }
        }
    })
}
