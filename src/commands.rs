// snipsync/src/commands.rs

use anyhow::{
    anyhow,
    Context,
    Result,
};
use std::{
    env,
    fs,
    io::{
        self,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
    process::Command,
};
use tracing::debug;
use crate::{
    api::RemoteApi,
    completion::CompletionIndex,
    config::{
        Config,
        Verbosity,
    },
    metadata::Snapshot,
    scan::LocalTree,
    scm::GitScm,
    snippet::SnippetRecord,
    sync,
    util,
};

pub fn run_cli() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "pull" => pull_snippets()?,
        "ls"   => list_snippets(args.get(2).map(|s| s.as_str()))?,
        "edit" => edit_snippet_file(args.get(2).map(|s| s.as_str()))?,
        "help" | _ => print_help(),
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Resolve the on-disk layout under the snippet home (idempotent).
fn resolve_paths() -> Result<ResolvedPaths> {
    let home = util::snippet_home().context("resolving snippet home")?;
    let state_dir = home.join(".snipsync");
    let history_dir = state_dir.join("history");

    for d in [&home, &state_dir, &history_dir] {
        fs::create_dir_all(d).with_context(|| format!("creating {}", d.display()))?;
    }

    Ok(ResolvedPaths {
        config_file: state_dir.join("config.json"),
        snapshot_file: state_dir.join("metadata.json"),
        history_dir,
        home,
    })
}

struct ResolvedPaths {
    home: PathBuf,
    config_file: PathBuf,
    snapshot_file: PathBuf,
    history_dir: PathBuf,
}

/// Update local snippets from the remote: pull what exists, clone what is
/// new, then replace the metadata snapshot.
fn pull_snippets() -> Result<()> {
    let p = resolve_paths()?;
    let config = Config::load(&p.config_file)?;

    let api = RemoteApi::new(&config);
    let remote = api
        .fetch_all()
        .context("fetching remote snippet listing")?;
    println!("Fetched {} snippets for {}", remote.len(), config.username);

    archive_snapshot(&p)?;

    let report = sync::sync(&GitScm, &remote, &p.home, &p.snapshot_file)?;
    for failure in &report.failures {
        println!("warning: snippet {}: {:#}", failure.snippet_id, failure.error);
    }
    println!(
        "Done: {} cloned, {} pulled, {} failed.",
        report.cloned,
        report.pulled,
        report.failed()
    );
    Ok(())
}

/// Keep a copy of the previous snapshot before it is overwritten.
fn archive_snapshot(p: &ResolvedPaths) -> Result<()> {
    if !p.snapshot_file.exists() {
        return Ok(());
    }
    let ts = util::now_ts_compact();
    let backup = p.history_dir.join(format!("metadata_{ts}.json"));
    fs::copy(&p.snapshot_file, &backup)
        .with_context(|| format!("archiving snapshot to {}", backup.display()))?;
    debug!(backup = %backup.display(), "snapshot archived");
    Ok(())
}

/// List snippets from the last snapshot. `-v` lists every local file;
/// snippets missing locally are marked so the user knows to `pull`.
fn list_snippets(flag: Option<&str>) -> Result<()> {
    let p = resolve_paths()?;
    let config = Config::load(&p.config_file)?;
    ensure_snapshot_exists(&p.snapshot_file)?;
    let snapshot = Snapshot::load(&p.snapshot_file)?;
    let tree = LocalTree::scan(&p.home)?;

    let detailed = match flag {
        Some("-v") => true,
        None => config.verbose == Verbosity::Detailed,
        Some(other) => return Err(anyhow!("unknown flag {other}; try `snipsync ls -v`")),
    };

    for meta in &snapshot.snippets {
        let record = SnippetRecord::resolve(meta.clone(), &tree);
        let dir_name = match record.dir_name() {
            Some(name) => name,
            None => {
                println!("[{}] not on disk yet. Run `snipsync pull`.", meta.id);
                continue;
            }
        };
        if detailed {
            for file_name in record.list_files()? {
                println!("{}/{}/{}", meta.owner, dir_name, file_name);
            }
        } else {
            let title = if meta.title.is_empty() { "(untitled)" } else { &meta.title };
            println!("[{}] {}", meta.id, title);
        }
    }
    Ok(())
}

/// Fuzzy-find a snippet file and open it in the editor.
fn edit_snippet_file(pattern_arg: Option<&str>) -> Result<()> {
    let p = resolve_paths()?;
    ensure_snapshot_exists(&p.snapshot_file)?;
    let snapshot = Snapshot::load(&p.snapshot_file)?;
    let tree = LocalTree::scan(&p.home)?;
    let index = CompletionIndex::build(&snapshot.snippets, &tree)?;

    if index.is_empty() {
        println!("No local snippet files yet. Run `snipsync pull` first.");
        return Ok(());
    }

    let pattern = match pattern_arg {
        Some(s) => s.to_string(),
        None => prompt_pattern()?,
    };
    let pattern = pattern.trim();

    let matches = index.complete(pattern)?;
    let best = match matches.first() {
        Some(entry) => entry,
        None => {
            println!("Nothing matches {pattern:?}.");
            return Ok(());
        }
    };

    if matches.len() > 1 {
        println!("Opening {} ({} other matches)", best.rel_path(), matches.len() - 1);
        for entry in matches.iter().skip(1).take(9) {
            println!("  {}", entry.rel_path());
        }
    }
    open_in_editor(&p.home.join(best.rel_path()))
}

fn prompt_pattern() -> Result<String> {
    print!("[edit file] > ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("reading pattern from stdin")?;
    Ok(line)
}

/// Hand the file to $VISUAL/$EDITOR (vi as a last resort) and wait.
fn open_in_editor(path: &Path) -> Result<()> {
    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("launching {editor}"))?;
    if !status.success() {
        return Err(anyhow!("{editor} exited with {status}"));
    }
    Ok(())
}

fn ensure_snapshot_exists(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    Err(anyhow!(
        "No snapshot at {}. Run `snipsync pull` first.",
        path.display()
    ))
}

fn print_help() {
    println!(
r#"
snipsync - mirror your remote snippets locally

USAGE:
    snipsync pull         # Fetch the remote listing, clone new snippets, pull known ones
    snipsync ls [-v]      # List snippets from the last snapshot (-v: every local file)
    snipsync edit [TEXT]  # Fuzzy-find a snippet file and open it in $EDITOR
    snipsync help         # Show this message

Snippets live under $SNIPSYNC_HOME (default ~/.snippets) as
<owner>/<title-slug>-<id>/; state is kept in <home>/.snipsync/.
"#    );
}
