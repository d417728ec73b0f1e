// snipsync/src/completion.rs
//! The `owner/dir/file` path list behind fuzzy completion.

use anyhow::Result;
use crate::{
    fuzzy,
    metadata::SnippetMetadata,
    scan::LocalTree,
    snippet::SnippetRecord,
};

/// One completable path. Exists only for snippets present on disk; a
/// snippet fetched remotely but not yet cloned contributes nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionEntry {
    pub owner: String,
    pub dir_name: String,
    pub file_name: String,
    path: String,
}

impl CompletionEntry {
    /// `owner/dir/file`, relative to the snippet home.
    pub fn rel_path(&self) -> &str {
        &self.path
    }
}

pub struct CompletionIndex {
    entries: Vec<CompletionEntry>,
}

impl CompletionIndex {
    /// Walk the snapshot in order. Snippets without a local directory are
    /// skipped; cloned ones contribute one entry per file, in sorted file
    /// order. That snapshot-then-file ordering is the stable-sort baseline
    /// the ranking ties break against.
    pub fn build(snippets: &[SnippetMetadata], tree: &LocalTree) -> Result<CompletionIndex> {
        let mut entries = Vec::new();
        for meta in snippets {
            let record = SnippetRecord::resolve(meta.clone(), tree);
            let dir_name = match record.dir_name() {
                Some(name) => name,
                None => continue, // not cloned yet: nothing to complete
            };
            for file_name in record.list_files()? {
                let path = format!("{}/{}/{}", record.meta.owner, dir_name, file_name);
                entries.push(CompletionEntry {
                    owner: record.meta.owner.clone(),
                    dir_name: dir_name.clone(),
                    file_name,
                    path,
                });
            }
        }
        Ok(CompletionIndex { entries })
    }

    pub fn entries(&self) -> &[CompletionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ranked completion; zero matches is an empty vec, not an error.
    pub fn complete(&self, partial: &str) -> Result<Vec<&CompletionEntry>> {
        let paths: Vec<&str> = self.entries.iter().map(CompletionEntry::rel_path).collect();
        let order = fuzzy::rank_indices(partial, &paths)?;
        Ok(order.into_iter().map(|i| &self.entries[i]).collect())
    }
}

/* ===================================== Tests ===================================== */
