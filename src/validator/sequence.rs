use crate::models::IssueSet;
use std::collections::{BTreeMap, BTreeSet};

/// Find missing, duplicate and out-of-order numbers
///
/// Absent entries are dropped before any check, so a gap left by an
/// unnumbered element shows up under `missing` and as a sequence error
/// between its present neighbours, never as an error involving the gap
/// itself.
///
/// `missing` lists every absent value in `1..=max`, so callers bound `max`
/// first; `DocumentValidator` rejects numbers above its configured ceiling.
pub fn detect_issues<I>(numbers: I) -> IssueSet
where
    I: IntoIterator<Item = Option<u64>>,
{
    let present: Vec<u64> = numbers.into_iter().flatten().collect();
    let Some(&max) = present.iter().max() else {
        return IssueSet::default();
    };

    let seen: BTreeSet<u64> = present.iter().copied().collect();
    let missing = (1..=max).filter(|n| !seen.contains(n)).collect();

    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for n in &present {
        *counts.entry(*n).or_insert(0) += 1;
    }
    let duplicates = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(n, _)| n)
        .collect();

    let sequence_errors = present
        .windows(2)
        .filter(|pair| pair[0].checked_add(1) != Some(pair[1]))
        .map(|pair| (pair[0], pair[1]))
        .collect();

    IssueSet {
        missing,
        duplicates,
        sequence_errors,
    }
}
