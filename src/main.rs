// src/main.rs

pub mod api;
pub mod commands;
pub mod completion;
pub mod config;
pub mod fuzzy;
pub mod metadata;
pub mod scan;
pub mod scm;
pub mod snippet;
pub mod sync;
pub mod util;

use anyhow::Result;

fn main() -> Result<()> {
    commands::run_cli()
}
