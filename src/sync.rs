// snipsync/src/sync.rs
//! Local/remote reconciliation: pull what exists, clone what is new,
//! report what failed, then replace the metadata snapshot wholesale.

use anyhow::{
    Context,
    Result,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};
use tracing::{info, warn};
use crate::{
    metadata::{
        Snapshot,
        SnippetMetadata,
    },
    scan::LocalTree,
    scm::Scm,
};

/// One snippet that could not be converged.
#[derive(Debug)]
pub struct SyncFailure {
    pub snippet_id: String,
    pub error: anyhow::Error,
}

/// Aggregate outcome of one reconciliation run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub cloned: usize,
    pub pulled: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Converge the local tree on `remote`: known snippets are pulled in
/// place, unknown ones cloned to `<home>/<owner>/<slug(title)>-<id>`.
///
/// Snippets are processed sequentially in listing order; one snippet's
/// clone/pull failure is recorded and the batch continues. After the
/// batch the snapshot file is replaced atomically with the full remote
/// listing, so a crash mid-write leaves the previous snapshot intact.
pub fn sync(
    scm: &dyn Scm,
    remote: &[SnippetMetadata],
    home: &Path,
    snapshot_file: &Path,
) -> Result<SyncReport> {
    let tree = LocalTree::scan(home)?;
    let mut report = SyncReport::default();

    for meta in remote {
        match tree.resolve(&meta.owner, &meta.id) {
            Some(dir) => {
                info!(id = %meta.id, dir = %dir.display(), "pulling");
                match scm.pull(&dir) {
                    Ok(()) => report.pulled += 1,
                    Err(error) => {
                        warn!(id = %meta.id, %error, "pull failed");
                        report.failures.push(SyncFailure {
                            snippet_id: meta.id.clone(),
                            error: error.into(),
                        });
                    }
                }
            }
            None => match clone_new(scm, meta, home) {
                Ok(dest) => {
                    info!(id = %meta.id, dest = %dest.display(), "cloned");
                    report.cloned += 1;
                }
                Err(error) => {
                    warn!(id = %meta.id, %error, "clone failed");
                    report.failures.push(SyncFailure {
                        snippet_id: meta.id.clone(),
                        error,
                    });
                }
            },
        }
    }

    Snapshot::new(remote.to_vec())
        .store(snapshot_file)
        .context("replacing metadata snapshot")?;

    Ok(report)
}

fn clone_new(scm: &dyn Scm, meta: &SnippetMetadata, home: &Path) -> Result<PathBuf> {
    let owner_dir = home.join(&meta.owner);
    fs::create_dir_all(&owner_dir)
        .with_context(|| format!("creating {}", owner_dir.display()))?;
    let dest = owner_dir.join(meta.local_dir_name());
    scm.clone_repo(&meta.clone_url, &dest)?;
    Ok(dest)
}

/* ===================================== Tests ===================================== */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scm::ScmError;
    use std::cell::RefCell;

    fn meta(id: &str, title: &str, owner: &str) -> SnippetMetadata {
        SnippetMetadata {
            id: id.into(),
            title: title.into(),
            owner: owner.into(),
            clone_url: format!("ssh://host/{id}"),
        }
    }

    /// Records calls; clone creates the destination directory the way a
    /// real clone would, so a second run resolves it.
    #[derive(Default)]
    struct MockScm {
        calls: RefCell<Vec<(&'static str, PathBuf)>>,
        fail_urls: Vec<String>,
    }

    impl Scm for MockScm {
        fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), ScmError> {
            self.calls.borrow_mut().push(("clone", dest.to_path_buf()));
            if self.fail_urls.iter().any(|u| u == url) {
                return Err(ScmError::Failed {
                    command: format!("git clone {url}"),
                    status: "exit status: 128".into(),
                    stderr: "fatal: repository not found".into(),
                });
            }
            fs::create_dir_all(dest).unwrap();
            Ok(())
        }

        fn pull(&self, dir: &Path) -> Result<(), ScmError> {
            self.calls.borrow_mut().push(("pull", dir.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn new_snippet_is_cloned_to_slug_id_path() {
        let home = tempfile::tempdir().unwrap();
        let snapshot_file = home.path().join(".snipsync/metadata.json");
        let scm = MockScm::default();
        let remote = vec![meta("abc123", "My Notes", "alice")];

        let report = sync(&scm, &remote, home.path(), &snapshot_file).unwrap();

        assert_eq!(report.cloned, 1);
        assert_eq!(report.pulled, 0);
        assert_eq!(report.failed(), 0);
        assert_eq!(
            *scm.calls.borrow(),
            vec![("clone", home.path().join("alice/my-notes-abc123"))]
        );

        let snap = Snapshot::load(&snapshot_file).unwrap();
        assert_eq!(snap.snippets, remote);
    }

    #[test]
    fn existing_directory_is_pulled_not_cloned() {
        let home = tempfile::tempdir().unwrap();
        let snapshot_file = home.path().join(".snipsync/metadata.json");
        fs::create_dir_all(home.path().join("alice/my-notes-abc123")).unwrap();
        let scm = MockScm::default();
        let remote = vec![meta("abc123", "My Notes", "alice")];

        let report = sync(&scm, &remote, home.path(), &snapshot_file).unwrap();

        assert_eq!(report.cloned, 0);
        assert_eq!(report.pulled, 1);
        assert_eq!(
            *scm.calls.borrow(),
            vec![("pull", home.path().join("alice/my-notes-abc123"))]
        );
    }

    #[test]
    fn second_run_only_pulls() {
        let home = tempfile::tempdir().unwrap();
        let snapshot_file = home.path().join(".snipsync/metadata.json");
        let scm = MockScm::default();
        let remote = vec![meta("abc123", "My Notes", "alice")];

        let first = sync(&scm, &remote, home.path(), &snapshot_file).unwrap();
        let second = sync(&scm, &remote, home.path(), &snapshot_file).unwrap();

        assert_eq!(first.cloned, 1);
        assert_eq!(second.cloned, 0);
        assert_eq!(second.pulled, 1);
    }

    #[test]
    fn one_failure_does_not_abort_the_batch() {
        let home = tempfile::tempdir().unwrap();
        let snapshot_file = home.path().join(".snipsync/metadata.json");
        let scm = MockScm {
            fail_urls: vec!["ssh://host/abc123".into()],
            ..Default::default()
        };
        let remote = vec![
            meta("abc123", "Broken", "alice"),
            meta("def456", "Fine", "alice"),
        ];

        let report = sync(&scm, &remote, home.path(), &snapshot_file).unwrap();

        assert_eq!(report.cloned, 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].snippet_id, "abc123");
        // the snapshot is still replaced with the full listing
        let snap = Snapshot::load(&snapshot_file).unwrap();
        assert_eq!(snap.snippets.len(), 2);
    }

    #[test]
    fn empty_title_clones_to_bare_id() {
        let home = tempfile::tempdir().unwrap();
        let snapshot_file = home.path().join(".snipsync/metadata.json");
        let scm = MockScm::default();
        let remote = vec![meta("abc123", "", "alice")];

        sync(&scm, &remote, home.path(), &snapshot_file).unwrap();

        assert_eq!(
            *scm.calls.borrow(),
            vec![("clone", home.path().join("alice/abc123"))]
        );
    }

    #[test]
    fn snapshot_is_overwritten_wholesale() {
        let home = tempfile::tempdir().unwrap();
        let snapshot_file = home.path().join(".snipsync/metadata.json");
        let scm = MockScm::default();

        sync(
            &scm,
            &[meta("abc123", "a", "alice"), meta("def456", "b", "alice")],
            home.path(),
            &snapshot_file,
        )
        .unwrap();
        sync(&scm, &[meta("abc123", "a", "alice")], home.path(), &snapshot_file).unwrap();

        let snap = Snapshot::load(&snapshot_file).unwrap();
        assert_eq!(snap.snippets.len(), 1);
        assert_eq!(snap.snippets[0].id, "abc123");
    }
}
