//! Distance aggregation
//!
//! Totals are always derived server side. A leaf swims
//! `repeat * distance_meters`, a set with sub-sets swims `repeat` times the sum
//! of its sub-sets, and the training total is the plain sum of its sets.

use tracing::debug;

use super::types::{Training, TrainingSet};

/// Rewrite every `total_distance` in the tree bottom-up
///
/// Never fails and is idempotent. Client supplied totals are discarded.
/// Validation rejects trees whose totals overflow `i32`, so saturation is
/// never reached for accepted input.
pub fn recompute(mut training: Training) -> Training {
    recompute_in_place(&mut training);
    training
}

pub fn recompute_in_place(training: &mut Training) {
    let total = training
        .sets
        .iter_mut()
        .map(recompute_set)
        .fold(0, i32::saturating_add);

    if training.total_distance != total {
        debug!(
            submitted = training.total_distance,
            computed = total,
            "Training total distance differs from submitted value"
        );
    }
    training.total_distance = total;
}

fn recompute_set(set: &mut TrainingSet) -> i32 {
    let per_repeat = if set.is_leaf() {
        // Leaves without a distance are rejected by validation before this runs
        set.distance_meters.unwrap_or(0)
    } else {
        set.children_mut()
            .iter_mut()
            .map(recompute_set)
            .fold(0, i32::saturating_add)
    };
    let total = set.repeat.saturating_mul(per_repeat);

    if set.total_distance != total {
        debug!(
            set_order = ?set.set_order,
            sub_set_order = ?set.sub_set_order,
            submitted = set.total_distance,
            computed = total,
            "Set total distance differs from submitted value"
        );
    }
    set.total_distance = total;
    total
}
