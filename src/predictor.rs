//! Next-word selection over a [`Model`].
//!
//! Two sampling policies exist and a session uses exactly one of them:
//!
//! - **Max-frequency**: the most frequent continuation wins; ties are broken
//!   uniformly at random among the tied candidates only.
//! - **Laplace**: every candidate is drawn with probability
//!   `(count + k) / (total + k * m)` where `k` is [`LAPLACE_K`] and `m` the
//!   number of candidates, so rare continuations still get a chance.
//!
//! Both policies return nothing when the prefix is unknown.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{Candidate, Model};

/// Smoothing constant added to every candidate count.
pub const LAPLACE_K: f64 = 1.0;

/// How a continuation is chosen among a prefix's candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingPolicy {
    /// Deterministic except between equally frequent candidates.
    #[default]
    MaxFrequency,
    /// Probabilistic draw with add-one smoothing.
    Laplace,
}

/// Predict the word following `prefix`.
///
/// Looks the prefix up case-insensitively and picks one of its candidates
/// according to `policy`.
///
/// # Arguments
/// * `prefix` - The word just typed
/// * `model` - The model built from the current note
/// * `policy` - How to choose among several candidates
/// * `rng` - Randomness for tie-breaking and sampling
///
/// # Returns
/// The chosen candidate, carrying `prefix` exactly as passed in, or `None`
/// when the model has never seen the prefix.
///
/// # Example
/// ```rust
/// use noteassist::model::Model;
/// use noteassist::predictor::{predict, SamplingPolicy};
///
/// let model = Model::from_text("the cat sat on the mat the cat ran").unwrap();
/// let next = predict("the", &model, SamplingPolicy::MaxFrequency, &mut rand::thread_rng());
/// assert_eq!(next.unwrap().word, "cat");
/// ```
pub fn predict<R: Rng>(
    prefix: &str,
    model: &Model,
    policy: SamplingPolicy,
    rng: &mut R,
) -> Option<Candidate> {
    let candidates = model.candidates(prefix)?;

    let chosen = match policy {
        SamplingPolicy::MaxFrequency => most_frequent(candidates, rng),
        SamplingPolicy::Laplace => sample_laplace(candidates, rng),
    }?;

    Some(Candidate {
        word: chosen.word.clone(),
        count: chosen.count,
        prefix: prefix.to_string(),
    })
}

/// Pick uniformly among the candidates sharing the highest count.
pub fn most_frequent<'a, R: Rng>(
    candidates: &'a [Candidate],
    rng: &mut R,
) -> Option<&'a Candidate> {
    let max_count = candidates.iter().map(|c| c.count).max()?;

    let top: Vec<&Candidate> = candidates.iter().filter(|c| c.count == max_count).collect();

    top.choose(rng).copied()
}

/// Smoothed selection probability of each candidate, in stored order.
pub fn laplace_probabilities(candidates: &[Candidate]) -> Vec<f64> {
    let total: u64 = candidates.iter().map(|c| c.count).sum();
    let distinct = candidates.len() as f64;
    let denominator = total as f64 + LAPLACE_K * distinct;

    candidates
        .iter()
        .map(|c| (c.count as f64 + LAPLACE_K) / denominator)
        .collect()
}

/// Draw one candidate from the smoothed distribution.
///
/// If rounding keeps the cumulative sum from ever exceeding the draw, the
/// max-frequency choice is returned instead, so a non-empty slice always
/// yields a candidate.
pub fn sample_laplace<'a, R: Rng>(
    candidates: &'a [Candidate],
    rng: &mut R,
) -> Option<&'a Candidate> {
    let draw: f64 = rng.gen();
    pick_cumulative(candidates, &laplace_probabilities(candidates), draw)
        .or_else(|| most_frequent(candidates, rng))
}

fn pick_cumulative<'a>(
    candidates: &'a [Candidate],
    probabilities: &[f64],
    draw: f64,
) -> Option<&'a Candidate> {
    let mut cumulative = 0.0;
    for (candidate, probability) in candidates.iter().zip(probabilities) {
        cumulative += probability;
        if cumulative > draw {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(word: &str, count: u64) -> Candidate {
        Candidate {
            word: word.to_string(),
            count,
            prefix: "p".to_string(),
        }
    }

    #[test]
    fn test_predict_unknown_prefix_is_none() {
        let model = Model::from_text("alpha beta gamma").unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(predict("delta", &model, SamplingPolicy::MaxFrequency, &mut rng).is_none());
        assert!(predict("delta", &model, SamplingPolicy::Laplace, &mut rng).is_none());
        assert!(predict("", &model, SamplingPolicy::MaxFrequency, &mut rng).is_none());
    }

    #[test]
    fn test_max_frequency_end_to_end() {
        let model = Model::from_text("the cat sat on the mat the cat ran").unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let next = predict("The", &model, SamplingPolicy::MaxFrequency, &mut rng).unwrap();
            assert_eq!(next.word, "cat");
            assert_eq!(next.count, 2);
            assert_eq!(next.prefix, "The");
        }
    }

    #[test]
    fn test_max_frequency_only_returns_tied_maximum() {
        let candidates = vec![
            candidate("low", 1),
            candidate("high_a", 4),
            candidate("mid", 3),
            candidate("high_b", 4),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_a = false;
        let mut seen_b = false;

        for _ in 0..200 {
            let chosen = most_frequent(&candidates, &mut rng).unwrap();
            assert_eq!(chosen.count, 4);
            seen_a |= chosen.word == "high_a";
            seen_b |= chosen.word == "high_b";
        }

        assert!(seen_a && seen_b);
        assert!(most_frequent(&[], &mut rng).is_none());
    }

    #[test]
    fn test_laplace_probabilities_are_positive_and_sum_to_one() {
        let candidates = vec![candidate("a", 3), candidate("b", 1), candidate("c", 1)];
        let probabilities = laplace_probabilities(&candidates);

        // (3+1)/(5+3), (1+1)/(5+3), (1+1)/(5+3)
        assert_eq!(probabilities, vec![0.5, 0.25, 0.25]);
        assert!(probabilities.iter().all(|p| *p > 0.0));
        assert!(probabilities.iter().sum::<f64>() <= 1.0 + 1e-12);
    }

    #[test]
    fn test_laplace_dominant_candidate_tends_to_one() {
        let mut previous = 0.0;
        for count in [1, 10, 100, 10_000, 1_000_000] {
            let candidates = vec![candidate("big", count), candidate("small", 1)];
            let p = laplace_probabilities(&candidates)[0];
            assert!(p >= previous);
            previous = p;
        }
        assert!(previous > 0.999);
    }

    #[test]
    fn test_laplace_sampling_reaches_every_candidate() {
        let candidates = vec![candidate("a", 5), candidate("b", 1)];
        let mut rng = StdRng::seed_from_u64(3);
        let mut hits_a = 0;
        let mut hits_b = 0;

        for _ in 0..1000 {
            match sample_laplace(&candidates, &mut rng).unwrap().word.as_str() {
                "a" => hits_a += 1,
                _ => hits_b += 1,
            }
        }

        // Expected split is 6/8 vs 2/8.
        assert!(hits_a > hits_b);
        assert!(hits_b > 0);
    }

    #[test]
    fn test_cumulative_pick_boundaries() {
        let candidates = vec![candidate("a", 1), candidate("b", 1)];
        let probabilities = [0.5, 0.5];

        assert_eq!(pick_cumulative(&candidates, &probabilities, 0.0).unwrap().word, "a");
        assert_eq!(pick_cumulative(&candidates, &probabilities, 0.5).unwrap().word, "b");
        assert_eq!(pick_cumulative(&candidates, &probabilities, 0.99).unwrap().word, "b");
    }

    #[test]
    fn test_cumulative_drift_falls_back_to_max_frequency() {
        let candidates = vec![candidate("a", 1), candidate("b", 9)];
        // Probabilities that under-sum, as rounding could produce.
        let probabilities = [0.1, 0.8];
        assert!(pick_cumulative(&candidates, &probabilities, 0.95).is_none());

        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert!(sample_laplace(&candidates, &mut rng).is_some());
        }
    }
}
