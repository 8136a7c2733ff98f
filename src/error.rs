/// Error handling module for the gst-switch harness.
///
/// This module defines the error types used throughout the library.
/// Every fallible operation in the crate returns [`Result`], so callers can
/// distinguish a misconfigured launch from an executable that cannot be found
/// and from an OS-level process failure.
///
/// # Example
///
/// ```
/// use gst_switch_harness::error::{Error, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(_) => println!("Operation succeeded"),
///         Err(Error::InvalidConfig(msg)) => println!("Bad launch parameter: {}", msg),
///         Err(Error::Path(msg)) => println!("Cannot locate gst-switch-srv: {}", msg),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Errors that can occur in the gst-switch-harness library.
///
/// Each variant carries a human-readable message describing the failing
/// parameter or operation.
#[derive(Error, Debug)]
pub enum Error {
    /// A launch parameter failed validation.
    ///
    /// This error occurs when:
    /// - A port is empty, non-numeric, or outside the range 1..=65535
    /// - The controller address is empty or contains no `:`
    /// - The record file name is empty or contains a path separator
    ///
    /// It is always raised at configuration time, before any process exists.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The `gst-switch-srv` executable cannot be located.
    ///
    /// This error occurs when:
    /// - No explicit path was configured and the search-path lookup failed
    /// - The configured path does not contain the executable at spawn time
    #[error("Path error: {0}")]
    Path(String),

    /// An operation on the supervised server process failed.
    ///
    /// This error occurs when:
    /// - A lifecycle operation requires a running process but none exists
    /// - The OS rejects a signal send (terminate, kill, coverage flush)
    /// - Spawning fails for a reason other than a missing executable
    #[error("Server process error: {0}")]
    Process(String),

    /// Waiting on the server's output timed out.
    ///
    /// This error occurs when:
    /// - `wait_for_output` does not observe the requested number of pattern
    ///   matches before its timeout elapses
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Result type for gst-switch-harness operations.
///
/// This is a convenience type alias for `std::result::Result` with the `Error`
/// type from this module.
pub type Result<T> = std::result::Result<T, Error>;
