// snipsync/src/scan.rs
//! One pass over the snippet home per invocation.
//!
//! Checkouts live at `<home>/<owner>/<dir>` where `<dir>` ends with the
//! snippet id. Instead of globbing per snippet, the tree is scanned once
//! into an owner-keyed table; suffix lookups are then cheap and the
//! duplicate-suffix tie-break is explicit: lexicographically first name
//! wins.

use anyhow::{
    Context,
    Result,
};
use std::{
    collections::BTreeMap,
    path::{
        Path,
        PathBuf,
    },
};
use walkdir::WalkDir;

pub struct LocalTree {
    root: PathBuf,
    // owner -> snippet directory names, sorted
    dirs: BTreeMap<String, Vec<String>>,
}

impl LocalTree {
    /// Scan `<root>/<owner>/<dir>`. A missing root is an empty tree, not
    /// an error: nothing has been cloned yet.
    pub fn scan(root: &Path) -> Result<LocalTree> {
        let mut dirs: BTreeMap<String, Vec<String>> = BTreeMap::new();

        if root.is_dir() {
            let walker = WalkDir::new(root)
                .min_depth(2)
                .max_depth(2)
                .sort_by_file_name();
            for dent in walker {
                let dent =
                    dent.with_context(|| format!("scanning {}", root.display()))?;
                if !dent.file_type().is_dir() {
                    continue;
                }
                let owner = match dent.path().parent().and_then(|p| p.file_name()) {
                    Some(name) => name.to_string_lossy().into_owned(),
                    None => continue,
                };
                // dot-dirs (".snipsync" state) are not owners
                if owner.starts_with('.') {
                    continue;
                }
                let name = dent.file_name().to_string_lossy().into_owned();
                dirs.entry(owner).or_default().push(name);
            }
        }

        Ok(LocalTree {
            root: root.to_path_buf(),
            dirs,
        })
    }

    /// First (lexicographically smallest) directory of `owner` whose name
    /// ends with `id`. `None` means the snippet needs cloning, never a
    /// fault.
    pub fn resolve(&self, owner: &str, id: &str) -> Option<PathBuf> {
        self.dirs
            .get(owner)?
            .iter()
            .find(|name| name.ends_with(id))
            .map(|name| self.root.join(owner).join(name))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/* ===================================== Tests ===================================== */
