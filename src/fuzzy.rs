// snipsync/src/fuzzy.rs
//! Fuzzy ranking: "djm" matches any string containing d..j..m in order,
//! tighter matches first.

use anyhow::{
    Context,
    Result,
};
use regex::{Regex, RegexBuilder};

/// Rank `candidates` against `pattern`; candidates that do not contain the
/// pattern characters in order drop out.
///
/// The pattern characters are joined with non-greedy wildcards ("djm"
/// becomes `d.*?j.*?m`, case-insensitive) and each candidate is scored by
/// its leftmost match: shorter matched span first, earlier start offset
/// breaks ties, and the sort is stable so input order decides the rest.
/// An empty pattern matches everything with span zero, preserving input
/// order.
pub fn rank<'a>(pattern: &str, candidates: &[&'a str]) -> Result<Vec<&'a str>> {
    Ok(rank_indices(pattern, candidates)?
        .into_iter()
        .map(|i| candidates[i])
        .collect())
}

/// Same ranking, as indices into `candidates`.
pub fn rank_indices(pattern: &str, candidates: &[&str]) -> Result<Vec<usize>> {
    let re = build_pattern(pattern)?;
    let mut scored: Vec<(usize, usize, usize)> = Vec::with_capacity(candidates.len());
    for (idx, cand) in candidates.iter().enumerate() {
        if let Some(m) = re.find(cand) {
            scored.push((m.end() - m.start(), m.start(), idx));
        }
    }
    // Stable by construction: sort_by_key keeps input order on equal keys.
    scored.sort_by_key(|&(span, start, _)| (span, start));
    Ok(scored.into_iter().map(|(_, _, idx)| idx).collect())
}

fn build_pattern(pattern: &str) -> Result<Regex> {
    let expr = pattern
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect::<Vec<_>>()
        .join(".*?");
    RegexBuilder::new(&expr)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("building fuzzy pattern from {pattern:?}"))
}

/* ===================================== Tests ===================================== */

#[cfg(test)]
mod tests {
    use super::*;

    fn contains_in_order(candidate: &str, pattern: &str) -> bool {
        let lower = candidate.to_lowercase();
        let mut rest = lower.as_str();
        for ch in pattern.to_lowercase().chars() {
            match rest.find(ch) {
                Some(i) => rest = &rest[i + ch.len_utf8()..],
                None => return false,
            }
        }
        true
    }

    #[test]
    fn only_subsequence_matches_survive() {
        let candidates = ["django/models.py", "readme.md", "deploy.json", "xyz"];
        let ranked = rank("djm", &candidates).unwrap();
        assert!(!ranked.is_empty());
        for c in &ranked {
            assert!(contains_in_order(c, "djm"), "{c} lacks djm in order");
        }
        assert!(!ranked.contains(&"xyz"));
    }

    #[test]
    fn empty_pattern_preserves_input_order() {
        let candidates = ["b", "a", "c"];
        assert_eq!(rank("", &candidates).unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn shorter_span_wins() {
        let candidates = ["nooot.md", "note.md"];
        assert_eq!(rank("not", &candidates).unwrap(), vec!["note.md", "nooot.md"]);
    }

    #[test]
    fn earlier_start_breaks_span_ties() {
        let candidates = ["xxab", "xab"];
        assert_eq!(rank("ab", &candidates).unwrap(), vec!["xab", "xxab"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let ranked = rank("DJ", &["django"]).unwrap();
        assert_eq!(ranked, vec!["django"]);
    }

    #[test]
    fn pattern_chars_are_literal() {
        // "." must not act as a wildcard
        let ranked = rank("a.c", &["abc", "ab.c"]).unwrap();
        assert_eq!(ranked, vec!["ab.c"]);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let ranked = rank("zzz", &["note.md"]).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn indices_line_up_with_rank() {
        let candidates = ["nooot.md", "note.md"];
        let order = rank_indices("not", &candidates).unwrap();
        assert_eq!(order, vec![1, 0]);
    }
}
