// snipsync/src/metadata.rs
//! Remote snippet identity + the persisted listing snapshot.
//!
//! The snapshot is a cache of the last fetched remote listing, never a
//! source of truth: truth is the remote API plus the local filesystem.
//! It is replaced wholesale on every `pull`, via a sibling temp file and
//! a rename so the previous copy survives a crash mid-write.

use anyhow::{
    anyhow,
    Context,
    Result,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::Path,
};
use crate::util;

pub const SNAPSHOT_VERSION: u32 = 1;

/// One remote snippet as the API reports it. Immutable once fetched.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SnippetMetadata {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub owner: String,
    pub clone_url: String,
}

impl SnippetMetadata {
    /// Directory name a fresh clone gets: `<slug(title)>-<id>`, or the
    /// bare id when the title slugs away to nothing.
    ///
    /// The id suffix is the lookup invariant; everything before it is
    /// cosmetic.
    pub fn local_dir_name(&self) -> String {
        let slug = util::slugify(&self.title);
        if slug.is_empty() {
            self.id.clone()
        } else {
            format!("{}-{}", slug, self.id)
        }
    }
}

/// Full remote listing as last fetched.
#[derive(Serialize, Deserialize, Debug)]
pub struct Snapshot {
    pub version: u32,
    pub fetched_at: String,
    pub snippets: Vec<SnippetMetadata>,
}

impl Snapshot {
    pub fn new(snippets: Vec<SnippetMetadata>) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            fetched_at: util::now_rfc3339(),
            snippets,
        }
    }

    pub fn load(path: &Path) -> Result<Snapshot> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snap: Snapshot = serde_json::from_str(&raw).with_context(|| {
            format!(
                "snapshot {} is unreadable; re-run `snipsync pull`",
                path.display()
            )
        })?;
        if snap.version != SNAPSHOT_VERSION {
            return Err(anyhow!(
                "snapshot {} has version {} (expected {}); re-run `snipsync pull`",
                path.display(),
                snap.version,
                SNAPSHOT_VERSION
            ));
        }
        Ok(snap)
    }

    /// Replace the snapshot on disk atomically: write a pid-suffixed temp
    /// file next to the target, fsync, then rename over it. Readers never
    /// see a partial snapshot.
    pub fn store(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;

        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("snapshot path {} has no file name", path.display()))?
            .to_string_lossy();
        let tmp = dir.join(format!("{}.tmp.{}", name, std::process::id()));

        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        serde_json::to_writer_pretty(&mut f, self)
            .with_context(|| format!("writing {}", tmp.display()))?;
        f.sync_all()
            .with_context(|| format!("syncing {}", tmp.display()))?;

        fs::rename(&tmp, path)
            .with_context(|| format!("renaming {} over {}", tmp.display(), path.display()))?;
        Ok(())
    }
}

/* ===================================== Tests ===================================== */
