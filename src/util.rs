// snipsync/src/util.rs

use std::path::PathBuf;

/// Where snippets live: `$SNIPSYNC_HOME` wins, else `$HOME/.snippets`.
pub fn snippet_home() -> std::io::Result<PathBuf> {
    if let Some(home) = std::env::var_os("SNIPSYNC_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home = std::env::var_os("HOME").ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "HOME is not set")
    })?;
    Ok(PathBuf::from(home).join(".snippets"))
}

/// Lowercase, collapse every run of non-word characters to a single
/// hyphen, trim the ends. "My Notes" -> "my-notes".
///
/// Colliding slugs are fine; directory names stay unique via the
/// trailing snippet id.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            for lc in ch.to_lowercase() {
                out.push(lc);
            }
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// RFC3339 stamp recording when a snapshot was fetched.
pub fn now_rfc3339() -> String {
    use chrono::{Local, SecondsFormat};
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Compact, filesystem-safe stamp for history archives.
pub fn now_ts_compact() -> String {
    use chrono::{Local, Datelike, Timelike};
    let dt = Local::now();
    format!("{:04}{:02}{:02}_{:02}{:02}{:02}",
        dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), dt.second())
}

/* ===================================== Tests ===================================== */
