//! Named groups of music patterns, written as `<name>` in place of a pattern.

use itertools::Itertools;

use crate::{Bell, Stage};

use super::RegisterError;

/// The names of every music macro, in their canonical case.  Names are matched
/// case-insensitively.
pub const MACRO_NAMES: [&str; 4] = ["CRUs", "4-runs", "near-misses", "5678s"];

/// Expands the macro `name` into the text of the patterns it stands for on `stage`.  This can be
/// empty if the macro has no patterns on `stage` (e.g. `<CRUs>` needs at least six bells).
pub(crate) fn expand(name: &str, stage: Stage) -> Result<Vec<String>, RegisterError> {
    let canonical_name = MACRO_NAMES
        .iter()
        .find(|n| n.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| RegisterError::UnknownMacro {
            name: name.to_owned(),
            suggestions: crate::utils::suggestions(name, MACRO_NAMES, 3),
        })?;
    let patterns = match *canonical_name {
        "CRUs" => crus(stage),
        "4-runs" => runs(stage, 4),
        "near-misses" => near_misses(stage),
        "5678s" => tenors_together(stage).ok_or_else(|| RegisterError::MacroNotApplicable {
            name: name.to_owned(),
            stage,
        })?,
        _ => unreachable!(),
    };
    for p in &patterns {
        log::trace!("<{}> expands to {}", canonical_name, p);
    }
    Ok(patterns)
}

fn bell(index: usize) -> Bell {
    Bell::from_index(index as u8)
}

/// Writes a pattern from bells and optional stars
fn pattern(
    leading_star: bool,
    bells: impl IntoIterator<Item = Bell>,
    trailing_star: bool,
) -> String {
    let mut s = String::new();
    if leading_star {
        s.push('*');
    }
    s.extend(bells.into_iter().map(Bell::name));
    if trailing_star {
        s.push('*');
    }
    s
}

/// Two of `4`, `5` and `6` (in either order), followed by the remaining bells in rounds, e.g.
/// `*4678` or `*6578` on Major
fn crus(stage: Stage) -> Vec<String> {
    let n = stage.num_bells();
    if n < 6 {
        return Vec::new();
    }
    (3..6)
        .permutations(2)
        .map(|pair| pattern(true, pair.into_iter().chain(6..n).map(bell), false))
        .collect_vec()
}

/// Every run of `len` consecutive bells, ascending and descending, at the front and back of the
/// row
fn runs(stage: Stage, len: usize) -> Vec<String> {
    let n = stage.num_bells();
    if n < len {
        return Vec::new();
    }
    let mut patterns = Vec::new();
    for start in 0..=n - len {
        let run = (start..start + len).map(bell);
        for bells in [run.clone().collect_vec(), run.rev().collect_vec()] {
            patterns.push(pattern(false, bells.iter().copied(), true));
            // On `len` bells, a run at the front is also at the back
            if n > len {
                patterns.push(pattern(true, bells, false));
            }
        }
    }
    patterns
}

/// Rounds with one adjacent pair of bells swapped
fn near_misses(stage: Stage) -> Vec<String> {
    let n = stage.num_bells();
    (0..n.saturating_sub(1))
        .map(|swap| {
            let mut bells = (0..n).map(bell).collect_vec();
            bells.swap(swap, swap + 1);
            pattern(false, bells, false)
        })
        .collect_vec()
}

/// The back bells together in any order: `*` then any ordering of `567` on Triples, or any
/// ordering of `5678` at the front or back on Major
fn tenors_together(stage: Stage) -> Option<Vec<String>> {
    let perms = |bells: std::ops::Range<usize>| {
        let len = bells.len();
        bells.permutations(len).map(|p| p.into_iter().map(bell).collect_vec())
    };
    match stage {
        Stage::TRIPLES => Some(perms(4..7).map(|p| pattern(true, p, false)).collect()),
        Stage::MAJOR => Some(
            perms(4..8)
                .flat_map(|p| [pattern(false, p.clone(), true), pattern(true, p, false)])
                .collect(),
        ),
        _ => None,
    }
}
