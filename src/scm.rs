// snipsync/src/scm.rs
//! Clone/pull collaborators. The reconciliation engine only sees the
//! `Scm` trait; the real implementation shells out to git and treats it
//! as an opaque, possibly slow process.

use std::{
    path::Path,
    process::Command,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScmError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

pub trait Scm {
    /// Clone `url` into `dest`. The parent of `dest` must already exist.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), ScmError>;

    /// Update an existing checkout in place.
    fn pull(&self, dir: &Path) -> Result<(), ScmError>;
}

/// Git over `std::process::Command`, output captured.
pub struct GitScm;

impl Scm for GitScm {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), ScmError> {
        run_git(&["clone", url, &dest.to_string_lossy()])
    }

    fn pull(&self, dir: &Path) -> Result<(), ScmError> {
        run_git(&["-C", &dir.to_string_lossy(), "pull", "--ff-only"])
    }
}

fn run_git(args: &[&str]) -> Result<(), ScmError> {
    let command = format!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|source| ScmError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ScmError::Failed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/* ===================================== Tests ===================================== */
