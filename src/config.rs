// snipsync/src/config.rs
//! Explicit configuration value, threaded to the commands that need it.
//! There is no global config singleton.

use anyhow::{
    Context,
    Result,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::Path,
};
use crate::api::DEFAULT_API_BASE;

/// How much `ls` prints per snippet.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Short,
    Detailed,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub username: String,
    /// App password for the remote API, created on the provider's
    /// settings page. Read-only here; this tool never writes it.
    #[serde(default)]
    pub app_password: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub verbose: Verbosity,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path).with_context(|| {
            format!(
                "no config at {}; create it with at least {{\"username\": \"...\", \"app_password\": \"...\"}}",
                path.display()
            )
        })?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))
    }
}

/* ===================================== Tests ===================================== */
