use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::Question;

/// Category id the client sends to play across every category.
pub const ALL_CATEGORIES: i64 = 0;

/// Picks a question from `pool` whose id is not in `served`.
///
/// Draws uniformly from the whole pool and redraws on a served id, at most
/// `pool.len()` times. If every draw hits a served question the choice is
/// made among the remaining candidates directly, so an unserved question
/// is returned whenever one exists. `None` means the pool is exhausted.
pub fn select_question<'a, R: Rng + ?Sized>(
    pool: &'a [Question],
    served: &HashSet<i64>,
    rng: &mut R,
) -> Option<&'a Question> {
    for _ in 0..pool.len() {
        let candidate = &pool[rng.gen_range(0..pool.len())];
        if !served.contains(&candidate.id) {
            return Some(candidate);
        }
    }
    let remaining: Vec<&Question> = pool.iter().filter(|q| !served.contains(&q.id)).collect();
    remaining.choose(rng).copied()
}
