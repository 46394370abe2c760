use std::cmp::Ordering;
use std::collections::HashSet;
use std::num::NonZeroUsize;

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Poi, DEFAULT_POPULARITY};

/// Sampling weight of a row; anything that is not a finite non-negative number
/// counts as the default popularity.
pub fn sampling_weight(poi: &Poi) -> f64 {
    if poi.popularity.is_finite() && poi.popularity >= 0.0 {
        poi.popularity
    } else {
        DEFAULT_POPULARITY
    }
}

/// Stable sort, most popular first.
pub fn rank_by_popularity(pool: &mut [&Poi]) {
    pool.sort_by(|a, b| {
        sampling_weight(b)
            .partial_cmp(&sampling_weight(a))
            .unwrap_or(Ordering::Equal)
    });
}

/// Picks at most `top_k` rows, spreading across categories before repeating one.
///
/// Each round draws, weighted by popularity, from the rows not yet chosen whose
/// category is still unused; once every category is used the round draws from
/// all rows not yet chosen. Output is in draw order. Pools no larger than
/// `top_k` are returned whole.
pub fn select<'a, R: Rng + ?Sized>(
    candidates: &[&'a Poi],
    top_k: NonZeroUsize,
    rng: &mut R,
) -> Vec<&'a Poi> {
    let top_k = top_k.get();
    if candidates.len() <= top_k {
        return candidates.to_vec();
    }

    let mut chosen = vec![false; candidates.len()];
    let mut used_categories: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(top_k);

    for _ in 0..top_k {
        let mut pool: Vec<usize> = (0..candidates.len())
            .filter(|&idx| {
                !chosen[idx] && !used_categories.contains(candidates[idx].category.as_str())
            })
            .collect();
        if pool.is_empty() {
            pool = (0..candidates.len()).filter(|&idx| !chosen[idx]).collect();
        }

        let Some(pick) = weighted_pick(candidates, &pool, rng) else {
            break;
        };

        chosen[pick] = true;
        used_categories.insert(candidates[pick].category.as_str());
        out.push(candidates[pick]);
    }

    out
}

fn weighted_pick<R: Rng + ?Sized>(candidates: &[&Poi], pool: &[usize], rng: &mut R) -> Option<usize> {
    let mut weights: Vec<f64> = pool.iter().map(|&idx| sampling_weight(candidates[idx])).collect();

    // Scale into [0, 1] so the running total inside WeightedIndex stays finite.
    let max = weights.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        for weight in &mut weights {
            *weight /= max;
        }
    }

    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(pool[dist.sample(rng)]),
        // all-zero weights
        Err(_) => pool.choose(rng).copied(),
    }
}
