//! Selection operators
//!
//! The GA keeps one elite and breeds the runner-up pair, so selection is a
//! plain ranking by fitness.

/// Indices of the `n` highest scores, best first. Ties keep population
/// order; NaN ranks last.
pub fn select_elite(fitness: &[f32], n: usize) -> Vec<usize> {
    let rank = |i: usize| if fitness[i].is_nan() { f32::NEG_INFINITY } else { fitness[i] };
    let mut indices: Vec<usize> = (0..fitness.len()).collect();
    indices.sort_by(|&a, &b| rank(b).total_cmp(&rank(a)));
    indices.truncate(n);
    indices
}

/// Index of the highest score, first one on ties
pub fn best_index(fitness: &[f32]) -> Option<usize> {
    select_elite(fitness, 1).first().copied()
}
