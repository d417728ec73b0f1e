// snipsync/src/snippet.rs

use anyhow::{
    anyhow,
    Context,
    Result,
};
use std::{
    fs,
    path::PathBuf,
};
use crate::{
    metadata::SnippetMetadata,
    scan::LocalTree,
};

/// A remote snippet joined with its local checkout, when one exists.
pub struct SnippetRecord {
    pub meta: SnippetMetadata,
    pub dir: Option<PathBuf>,
}

impl SnippetRecord {
    pub fn resolve(meta: SnippetMetadata, tree: &LocalTree) -> SnippetRecord {
        let dir = tree.resolve(&meta.owner, &meta.id);
        SnippetRecord { meta, dir }
    }

    /// Absence means "needs cloning", never a fault.
    pub fn is_cloned(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir_name(&self) -> Option<String> {
        self.dir
            .as_ref()
            .and_then(|d| d.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Regular files directly inside the checkout, sorted by name.
    /// Errors when the snippet has not been cloned yet.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let dir = self.dir.as_ref().ok_or_else(|| {
            anyhow!(
                "snippet {} has no local directory; run `snipsync pull`",
                self.meta.id
            )
        })?;

        let mut names = Vec::new();
        for dent in
            fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?
        {
            let dent = dent.with_context(|| format!("listing {}", dir.display()))?;
            if dent.file_type()?.is_file() {
                names.push(dent.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/* ===================================== Tests ===================================== */
