//! Configuration module for the gst-switch harness.
//!
//! This module handles validation and access to the launch parameters of the
//! `gst-switch-srv` process. A [`ServerConfig`] is built through
//! [`ServerConfigBuilder`], which runs every field validator before any OS
//! resource is touched; once built, the configuration is immutable, so the
//! parameters of a running server can never change underneath it.
//!
//! # Examples
//!
//! Building a configuration programmatically:
//!
//! ```
//! use gst_switch_harness::config::ServerConfig;
//!
//! let config = ServerConfig::builder()
//!     .video_port(3000)
//!     .audio_port(4000)
//!     .controller_address("tcp:host=::,port=5000")
//!     .record_file("output.data")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.video_port(), 3000);
//! ```
//!
//! Loading a configuration from JSON:
//!
//! ```
//! use gst_switch_harness::config::ServerConfig;
//!
//! let config = ServerConfig::parse_from_str(r#"{
//!     "videoPort": 3000,
//!     "audioPort": "4000",
//!     "controllerAddress": "tcp:host=::,port=5000",
//!     "recordFile": true
//! }"#).unwrap();
//! ```
pub mod validator;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use validator::{validate_controller_address, validate_port, validate_record_name};

/// Record-file behavior of the server, normalized from the tri-state input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFile {
    /// No recording; the record flag is omitted from the command line.
    Disabled,
    /// Record under the server's default file name (`-r`).
    DefaultName,
    /// Record under an explicit file name (`--record=<name>`).
    Named(String),
}

/// Raw record-file input accepted by the builder.
///
/// `false` disables recording, `true` enables it under the server's default
/// name, and a string names the record file explicitly. Conversions exist so
/// callers can pass a `bool` or string directly to
/// [`ServerConfigBuilder::record_file`].
#[derive(Debug, Clone)]
pub enum RecordFileSpec {
    /// Enable or disable recording with the default name.
    Enabled(bool),
    /// Record to the named file.
    Name(String),
}

impl From<bool> for RecordFileSpec {
    fn from(enabled: bool) -> Self {
        RecordFileSpec::Enabled(enabled)
    }
}

impl From<&str> for RecordFileSpec {
    fn from(name: &str) -> Self {
        RecordFileSpec::Name(name.to_string())
    }
}

impl From<String> for RecordFileSpec {
    fn from(name: String) -> Self {
        RecordFileSpec::Name(name)
    }
}

/// Validated launch configuration for a `gst-switch-srv` process.
///
/// Instances are immutable: construct one through [`ServerConfig::builder`]
/// or from JSON via [`ServerConfig::from_file`] / [`ServerConfig::parse_from_str`].
/// All validation has already happened by the time a value of this type
/// exists, so the command line it produces is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    executable_path: Option<PathBuf>,
    video_port: u16,
    audio_port: u16,
    controller_address: String,
    record_file: RecordFile,
    video_format: Option<String>,
    log_to_file: bool,
    tools_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Creates a builder seeded with the standard defaults
    /// (video 3000, audio 4000, controller `tcp:host=::,port=5000`,
    /// recording disabled, log-to-file enabled).
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the file cannot be read, is not
    /// valid JSON, or any launch parameter fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("failed to read config file: {}", e)))?;
        Self::parse_from_str(&content)
    }

    /// Parses and validates a configuration from a JSON string.
    ///
    /// Port fields accept JSON numbers and numeric strings equivalently;
    /// `recordFile` accepts a boolean or a file name.
    pub fn parse_from_str(content: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(content)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse JSON config: {}", e)))?;
        raw.into_builder()?.build()
    }

    /// Directory containing the `gst-switch-srv` executable, if configured.
    pub fn executable_path(&self) -> Option<&Path> {
        self.executable_path.as_deref()
    }

    /// Video input port.
    pub fn video_port(&self) -> u16 {
        self.video_port
    }

    /// Audio input port.
    pub fn audio_port(&self) -> u16 {
        self.audio_port
    }

    /// Controller DBus address.
    pub fn controller_address(&self) -> &str {
        &self.controller_address
    }

    /// Record-file behavior.
    pub fn record_file(&self) -> &RecordFile {
        &self.record_file
    }

    /// Video format string, passed through uninterpreted.
    pub fn video_format(&self) -> Option<&str> {
        self.video_format.as_deref()
    }

    /// Whether child output is redirected to `server.log`.
    pub fn log_to_file(&self) -> bool {
        self.log_to_file
    }

    /// Directory the coverage-report command runs in, if configured.
    pub fn tools_dir(&self) -> Option<&Path> {
        self.tools_dir.as_deref()
    }

    /// Assembles the server's command-line arguments, excluding the
    /// executable itself.
    ///
    /// The relative order is part of the wire contract with the
    /// `gst-switch-srv` argument parser and must not change:
    /// the free-form GStreamer option (if non-empty), the two input ports,
    /// the controller address, the record flag, then the video format.
    pub fn to_args(&self, extra_option: &str) -> Vec<String> {
        let mut args = Vec::new();
        if !extra_option.is_empty() {
            args.push(extra_option.to_string());
        }
        args.push(format!("--video-input-port={}", self.video_port));
        args.push(format!("--audio-input-port={}", self.audio_port));
        args.push(format!("--controller-address={}", self.controller_address));
        match &self.record_file {
            RecordFile::Disabled => {}
            RecordFile::DefaultName => args.push("-r".to_string()),
            RecordFile::Named(name) => args.push(format!("--record={}", name)),
        }
        if let Some(format) = &self.video_format {
            args.push(format!("--video-format={}", format));
        }
        args
    }
}

/// Builder for [`ServerConfig`].
///
/// Setters collect raw values; [`ServerConfigBuilder::build`] runs every
/// validator and either yields an immutable [`ServerConfig`] or the first
/// [`Error::InvalidConfig`] encountered. Nothing here touches the OS.
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    executable_path: Option<PathBuf>,
    video_port: String,
    audio_port: String,
    controller_address: String,
    record_file: RecordFileSpec,
    video_format: Option<String>,
    log_to_file: bool,
    tools_dir: Option<PathBuf>,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            executable_path: None,
            video_port: "3000".to_string(),
            audio_port: "4000".to_string(),
            controller_address: "tcp:host=::,port=5000".to_string(),
            record_file: RecordFileSpec::Enabled(false),
            video_format: None,
            log_to_file: true,
            tools_dir: None,
        }
    }
}

impl ServerConfigBuilder {
    /// Sets the directory containing the `gst-switch-srv` executable.
    ///
    /// When unset, the executable is resolved on `$PATH` at spawn time.
    pub fn executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Sets the video input port. Accepts integers and numeric strings.
    pub fn video_port(mut self, port: impl ToString) -> Self {
        self.video_port = port.to_string();
        self
    }

    /// Sets the audio input port. Accepts integers and numeric strings.
    pub fn audio_port(mut self, port: impl ToString) -> Self {
        self.audio_port = port.to_string();
        self
    }

    /// Sets the controller DBus address, e.g. `tcp:host=::,port=5000`.
    pub fn controller_address(mut self, address: impl Into<String>) -> Self {
        self.controller_address = address.into();
        self
    }

    /// Sets the record-file behavior: `false` disables recording, `true`
    /// records under the default name, a string names the record file.
    pub fn record_file(mut self, record_file: impl Into<RecordFileSpec>) -> Self {
        self.record_file = record_file.into();
        self
    }

    /// Sets the video format string, passed to the server uninterpreted.
    pub fn video_format(mut self, format: impl Into<String>) -> Self {
        self.video_format = Some(format.into());
        self
    }

    /// Controls whether child output is redirected to `server.log`.
    ///
    /// When disabled, output is piped to the harness and pattern matching via
    /// `wait_for_output` becomes available.
    pub fn log_to_file(mut self, enabled: bool) -> Self {
        self.log_to_file = enabled;
        self
    }

    /// Sets the directory the coverage-report command (`make coverage`) runs
    /// in. Coverage reporting is skipped when unset.
    pub fn tools_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tools_dir = Some(dir.into());
        self
    }

    /// Validates every field and produces the immutable configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first offending field.
    pub fn build(self) -> Result<ServerConfig> {
        let video_port = validate_port("video port", &self.video_port)?;
        let audio_port = validate_port("audio port", &self.audio_port)?;
        let controller_address = validate_controller_address(&self.controller_address)?;
        let record_file = match self.record_file {
            RecordFileSpec::Enabled(false) => RecordFile::Disabled,
            RecordFileSpec::Enabled(true) => RecordFile::DefaultName,
            RecordFileSpec::Name(name) => RecordFile::Named(validate_record_name(&name)?),
        };

        Ok(ServerConfig {
            executable_path: self.executable_path,
            video_port,
            audio_port,
            controller_address,
            record_file,
            video_format: self.video_format,
            log_to_file: self.log_to_file,
            tools_dir: self.tools_dir,
        })
    }
}

/// Wire form of the JSON configuration.
///
/// Ports and the record file are kept loosely typed here so JSON numbers,
/// numeric strings, and booleans all funnel through the same validators the
/// builder uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    executable_path: Option<PathBuf>,
    video_port: Option<serde_json::Value>,
    audio_port: Option<serde_json::Value>,
    controller_address: Option<String>,
    record_file: Option<serde_json::Value>,
    video_format: Option<String>,
    log_to_file: Option<bool>,
    tools_dir: Option<PathBuf>,
}

impl RawConfig {
    fn into_builder(self) -> Result<ServerConfigBuilder> {
        let mut builder = ServerConfig::builder();
        if let Some(path) = self.executable_path {
            builder = builder.executable_path(path);
        }
        if let Some(port) = self.video_port {
            builder = builder.video_port(port_text("videoPort", &port)?);
        }
        if let Some(port) = self.audio_port {
            builder = builder.audio_port(port_text("audioPort", &port)?);
        }
        if let Some(address) = self.controller_address {
            builder = builder.controller_address(address);
        }
        if let Some(record) = self.record_file {
            builder = match record {
                serde_json::Value::Bool(enabled) => builder.record_file(enabled),
                serde_json::Value::String(name) => builder.record_file(name),
                other => {
                    return Err(Error::InvalidConfig(format!(
                        "recordFile must be a boolean or a file name, got {}",
                        other
                    )))
                }
            };
        }
        if let Some(format) = self.video_format {
            builder = builder.video_format(format);
        }
        if let Some(enabled) = self.log_to_file {
            builder = builder.log_to_file(enabled);
        }
        if let Some(dir) = self.tools_dir {
            builder = builder.tools_dir(dir);
        }
        Ok(builder)
    }
}

fn port_text(field: &str, value: &serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::InvalidConfig(format!(
            "{} must be a number or numeric string, got {}",
            field, other
        ))),
    }
}
