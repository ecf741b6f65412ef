//! Crossover operators for brain evolution

use morris_core::{Brain, BRAIN_SIZE};

/// Coefficient-wise mean of two parents
pub fn crossover_mean(a: &Brain, b: &Brain) -> Brain {
    let (a, b) = (a.as_array(), b.as_array());
    let mut child = [0.0; BRAIN_SIZE];
    for (i, w) in child.iter_mut().enumerate() {
        *w = (a[i] + b[i]) / 2.0;
    }
    Brain::from_array(child)
}
