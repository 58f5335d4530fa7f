use itertools::Itertools;

use crate::{Bell, InvalidRowError, Stage};

/// Length of the longest run (consecutive bells going up or down by one) off the start of an
/// [`Iterator`] of [`Bell`]s.  An empty iterator has run length 0.
pub fn run_len(iter: impl IntoIterator<Item = Bell>) -> usize {
    let mut iter = iter.into_iter().peekable();
    if iter.peek().is_none() {
        return 0;
    }
    iter.map(|b| b.index() as i16)
        .tuple_windows::<(i16, i16)>()
        .take_while(|&(i1, i2)| (i1 - i2).abs() == 1)
        .count()
        + 1
}

/// Given some [`Bell`]s and a [`Stage`], simultaneously check for duplicate [`Bell`]s and any
/// [`Bell`]s which are too big for the given [`Stage`].
pub(crate) fn check_duplicate_or_out_of_stage(
    bells: impl IntoIterator<Item = Bell>,
    stage: Stage,
) -> Result<(), InvalidRowError> {
    // Every stage fits in a `u64` bitmap
    let mut seen = 0u64;
    for b in bells {
        if !stage.contains(b) {
            return Err(InvalidRowError::BellOutOfStage(b, stage));
        }
        let mask = 1u64 << b.index();
        if seen & mask != 0 {
            return Err(InvalidRowError::DuplicateBell(b));
        }
        seen |= mask;
    }
    // By the pigeon-hole principle, `n` in-range bells with no duplicates must cover the stage
    Ok(())
}

/// Returns up to `max_suggestions` of the `candidates` which are closest to `name` by edit
/// distance, closest first.  Candidates further than half of `name`'s length away are never
/// suggested.
pub(crate) fn suggestions<'c>(
    name: &str,
    candidates: impl IntoIterator<Item = &'c str>,
    max_suggestions: usize,
) -> Vec<String> {
    let name = name.to_lowercase();
    let max_distance = name.chars().count().max(2) / 2;
    let mut shortlist = shortlist::Shortlist::new(max_suggestions);
    for candidate in candidates {
        let distance = edit_distance::edit_distance(&name, &candidate.to_lowercase());
        if distance <= max_distance {
            // `Shortlist` keeps the largest items, so the distance is reversed
            shortlist.push((std::cmp::Reverse(distance), candidate));
        }
    }
    shortlist
        .into_sorted_vec()
        .into_iter()
        .rev()
        .map(|(_, c)| c.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RowBuf;

    #[test]
    fn run_len() {
        #[track_caller]
        fn check(row: &str, exp_len: usize) {
            let row = RowBuf::parse(row).unwrap();
            assert_eq!(super::run_len(row.bell_iter()), exp_len);
        }

        check("12345678", 8);
        check("87654321", 8);
        check("43215678", 4);
        check("13245678", 1);
        check("1", 1);
        assert_eq!(super::run_len(std::iter::empty()), 0);
    }

    #[test]
    fn check_rows() {
        let bell = |c: char| Bell::from_name(c).unwrap();
        let bells = |s: &str| s.chars().map(bell).collect::<Vec<_>>();
        assert_eq!(check_duplicate_or_out_of_stage(bells("4213"), Stage::MINIMUS), Ok(()));
        assert_eq!(
            check_duplicate_or_out_of_stage(bells("4211"), Stage::MINIMUS),
            Err(InvalidRowError::DuplicateBell(bell('1')))
        );
        assert_eq!(
            check_duplicate_or_out_of_stage(bells("4215"), Stage::MINIMUS),
            Err(InvalidRowError::BellOutOfStage(bell('5'), Stage::MINIMUS))
        );
    }

    #[test]
    fn suggestions() {
        let names = ["crus", "4-runs", "near-misses", "5678s"];
        assert_eq!(super::suggestions("CRU", names, 3), ["crus"]);
        assert_eq!(super::suggestions("4runs", names, 3), ["4-runs", "crus"]);
        assert!(super::suggestions("wraps", names, 3).is_empty());
    }
}
