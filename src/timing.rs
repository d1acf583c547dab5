//! Per-word display durations.
//!
//! A segment's duration is shared between its words in proportion to their
//! character count. Words whose share falls under the floor are raised to it
//! and the difference is taken back from the remaining words.

use serde::Deserialize;

/// Lower bound for the rescale factor in [`FloorReclaim::Legacy`].
pub const LEGACY_MIN_SCALE: f64 = 0.001;

/// How the time granted to floored words is reclaimed from the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FloorReclaim {
    /// One rescale pass with the factor floored at [`LEGACY_MIN_SCALE`].
    /// Rescaled words may end up below the floor and the total is not
    /// guaranteed to match the segment duration.
    Legacy,
    /// Repeat the clamp until every word is at or above the floor. The total
    /// matches the segment duration whenever `words * floor <= duration`.
    #[default]
    Conserve,
}

/// Allocates `total` seconds across `tokens`, never going below `floor`.
pub fn allocate<S: AsRef<str>>(
    tokens: &[S],
    total: f64,
    floor: f64,
    policy: FloorReclaim,
) -> Vec<f64> {
    let lengths: Vec<usize> = tokens
        .iter()
        .map(|t| t.as_ref().chars().count())
        .collect();
    let total_chars: usize = lengths.iter().sum();
    if total_chars == 0 {
        return vec![floor; tokens.len()];
    }

    let raw: Vec<f64> = lengths
        .iter()
        .map(|&len| total * len as f64 / total_chars as f64)
        .collect();

    match policy {
        FloorReclaim::Legacy => reclaim_once(&raw, floor),
        FloorReclaim::Conserve => reclaim_until_stable(&raw, total, floor),
    }
}

fn reclaim_once(raw: &[f64], floor: f64) -> Vec<f64> {
    let mut excess = 0.0;
    let mut pool = 0.0;
    for &share in raw {
        if share < floor {
            excess += floor - share;
        } else {
            pool += share;
        }
    }

    let scale = if pool > 0.0 {
        ((pool - excess) / pool).max(LEGACY_MIN_SCALE)
    } else {
        1.0
    };

    raw.iter()
        .map(|&share| if share < floor { floor } else { share * scale })
        .collect()
}

fn reclaim_until_stable(raw: &[f64], total: f64, floor: f64) -> Vec<f64> {
    let mut floored = vec![false; raw.len()];
    let mut scale = 1.0;

    loop {
        let floored_count = floored.iter().filter(|&&f| f).count();
        if floored_count == raw.len() {
            break;
        }

        let budget = total - floor * floored_count as f64;
        let free: f64 = raw
            .iter()
            .zip(&floored)
            .filter(|(_, f)| !**f)
            .map(|(share, _)| share)
            .sum();
        if budget <= 0.0 || free <= 0.0 {
            // Nothing left to hand out: every word shows for the floor.
            floored.iter_mut().for_each(|f| *f = true);
            break;
        }

        scale = budget / free;
        let mut changed = false;
        for (share, f) in raw.iter().zip(floored.iter_mut()) {
            if !*f && share * scale < floor {
                *f = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    raw.iter()
        .zip(&floored)
        .map(|(&share, &f)| if f { floor } else { share * scale })
        .collect()
}
