//*** START FILE: src/session/sampling.rs ***//
use rand::seq::index;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::corpus::{Candidate, SourceSentence};

/// Draws `min(count, pool.len())` distinct sentences. Result order is random.
pub fn sample_sentences<'a, R: Rng + ?Sized>(
    pool: &[&'a SourceSentence],
    count: usize,
    rng: &mut R,
) -> Vec<&'a SourceSentence> {
    let amount = count.min(pool.len());
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// Uniform permutation of `candidates` (Fisher–Yates over an index array).
///
/// The candidates are moved as whole values, so their provenance fields come
/// through untouched.
pub fn shuffle_candidates<R: Rng + ?Sized>(candidates: &[Candidate], rng: &mut R) -> Vec<Candidate> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.shuffle(rng);
    order.into_iter().map(|i| candidates[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sentences(n: usize) -> Vec<SourceSentence> {
        (0..n)
            .map(|i| SourceSentence {
                id: i.to_string(),
                source_text: String::new(),
                translations: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn sample_is_distinct_and_clamped() {
        let owned = sentences(7);
        let pool: Vec<&SourceSentence> = owned.iter().collect();
        let mut rng = rand::thread_rng();

        let picked = sample_sentences(&pool, 5, &mut rng);
        let ids: HashSet<&str> = picked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 5);

        assert_eq!(sample_sentences(&pool[..2], 5, &mut rng).len(), 2);
        assert!(sample_sentences(&pool[..0], 5, &mut rng).is_empty());
    }

    #[test]
    fn shuffle_keeps_every_candidate_and_its_provenance() {
        let candidates: Vec<Candidate> = (0..6)
            .map(|i| Candidate::from_corpus(&format!("t{}", i), "h", i))
            .collect();
        let shuffled = shuffle_candidates(&candidates, &mut rand::thread_rng());

        assert_eq!(shuffled.len(), candidates.len());
        for c in &shuffled {
            let idx = c.original_index.unwrap();
            assert_eq!(c, &candidates[idx]);
        }
    }
}
//*** END FILE: src/session/sampling.rs ***//
