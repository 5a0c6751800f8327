//! Command-line arguments

use crate::core::config::{Config, DEFAULT_CONFIG_PATH, ExtraAxes};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "neural-audit",
    version,
    about = "Submit a chat transcript and its context to an audit server and show the scores"
)]
pub struct Cli {
    /// Chat transcript (JSON) uploaded as `chat_file`
    #[arg(long, value_name = "FILE")]
    pub chat: Option<PathBuf>,

    /// Context / ground-truth document (JSON) uploaded as `context_file`
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Configuration file (overrides CONFIG_PATH)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Audit server base URL
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// How to fill the safety, tone and accuracy axes: placeholder or server
    #[arg(long, value_name = "POLICY")]
    pub extra_axes: Option<String>,

    /// Print the validated response as JSON instead of the panel
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Load configuration and apply command-line overrides on top
    ///
    /// Validation runs once, after flags, so a flag can correct a bad value
    /// from the file or the environment.
    pub fn load_config(&self) -> Result<Config> {
        let config_path = self
            .config
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned());
        let mut config = Config::from_sources(
            |key| match (key, &config_path) {
                ("CONFIG_PATH", Some(path)) => Some(path.clone()),
                _ => std::env::var(key).ok(),
            },
            DEFAULT_CONFIG_PATH,
        )?;

        if let Some(server) = &self.server {
            config.base_url = server.clone();
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = timeout;
        }
        if let Some(axes) = &self.extra_axes {
            config.extra_axes = ExtraAxes::from_str(axes)
                .context("Invalid --extra-axes value. Must be one of: placeholder, server")?;
        }
        config.validate()?;
        Ok(config)
    }
}
