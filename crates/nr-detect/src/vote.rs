/// Plurality vote over `labels`.
///
/// Returns the most frequent label and its count. Ties go to the label whose
/// first occurrence comes earliest in `labels`. `None` for an empty slice.
pub fn most_frequent<T: Copy + PartialEq>(labels: &[T]) -> Option<(T, usize)> {
    // First-encounter order; label sets here are a handful of heights or modes.
    let mut tally: Vec<(T, usize)> = Vec::new();
    for &label in labels {
        match tally.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => tally.push((label, 1)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (label, count) in tally {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((label, count));
        }
    }
    best
}

/// Element at index `len / 2` of the sorted values: the upper of the two
/// middle elements for an even count, never an average.
pub fn median_pick(values: &[usize]) -> Option<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.get(sorted.len() / 2).copied()
}
