//! Layout constraints for built view trees
//!
//! This module turns `@constraints` specs into [`ConstraintDescriptor`]s for
//! an external layout solver, and carries a reference solver for previews.

pub mod config;
pub mod resolve;
pub mod solver;
pub mod types;

pub use config::LayoutConfig;
pub use resolve::{resolve_constraint, FormatDirection, FormatOptions};
pub use solver::{solve_frames, FrameSolver, SolvedFrames, SolverError};
pub use types::*;

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    if a_chars.is_empty() {
        return n;
    }
    if n == 0 {
        return a_chars.len();
    }

    // Single rolling row instead of the full table
    let mut row: Vec<usize> = (0..=n).collect();
    for (i, ca) in a_chars.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[n]
}

/// Find similar names within a maximum edit distance, closest first
///
/// Candidates that would need rewriting the whole target are skipped.
pub(crate) fn find_similar<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let target_len = target.chars().count();
    let mut similar: Vec<(&str, usize)> = candidates
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist > 0 && dist <= max_distance && dist < target_len).then_some((name, dist))
        })
        .collect();

    similar.sort_by_key(|(_, d)| *d);
    similar.dedup();
    similar
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}
