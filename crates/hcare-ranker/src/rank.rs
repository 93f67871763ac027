//! Competition ranking of composite scores.

use std::cmp::Ordering;

/// Rank scores descending, 1 = best. Ties share the lowest rank of their
/// group and the next distinct score skips ahead ("min" method):
/// `[0.5, 0.8, 0.8]` ranks as `[3, 1, 1]`.
///
/// Scores must be finite; the pipeline rejects anything else before ranking.
pub fn competition_rank(scores: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0u32; scores.len()];
    let mut current = 0u32;
    for (pos, &idx) in order.iter().enumerate() {
        if pos == 0 || scores[idx] != scores[order[pos - 1]] {
            current = pos as u32 + 1;
        }
        ranks[idx] = current;
    }
    ranks
}
