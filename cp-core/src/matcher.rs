//! Fuzzy matching of digests against known clients
//!
//! A returning client rarely reproduces its previous extended fingerprint
//! exactly (a language override or a new font is enough to change it). The
//! matcher scores a probe digest against known digests and accepts the best
//! candidate at or above a similarity threshold.

use tracing::{debug, trace};

use crate::constants::matching::DEFAULT_MATCH_THRESHOLD;
use crate::hash::FuzzyDigest;

/// A known client that matched a probe
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Caller-supplied identifier of the known client
    pub id: String,
    /// Similarity score (0-100)
    pub score: f64,
}

impl MatchResult {
    /// Exact digest equality (score of 100)
    pub fn is_exact(&self) -> bool {
        self.score >= 100.0
    }
}

/// Threshold-based digest matcher
#[derive(Debug, Clone, Copy)]
pub struct FingerprintMatcher {
    threshold: f64,
}

impl FingerprintMatcher {
    /// Create a matcher; the threshold is clamped to 0-100
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 100.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// All candidates at or above the threshold, best first
    ///
    /// Candidates whose digest does not parse are skipped. Ties keep the
    /// candidates' input order.
    pub fn rank<'a, I>(&self, probe: &FuzzyDigest, candidates: I) -> Vec<MatchResult>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut results: Vec<MatchResult> = candidates
            .into_iter()
            .filter_map(|(id, digest)| match digest.parse::<FuzzyDigest>() {
                Ok(known) => {
                    let score = probe.similarity(&known);
                    trace!(id, score, block_size = known.block_size(), "Scored candidate");
                    Some(MatchResult {
                        id: id.to_string(),
                        score,
                    })
                }
                Err(e) => {
                    debug!(id, error = %e, "Skipping candidate with malformed digest");
                    None
                }
            })
            .filter(|result| result.score >= self.threshold)
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }

    /// Best candidate at or above the threshold
    pub fn best_match<'a, I>(&self, probe: &FuzzyDigest, candidates: I) -> Option<MatchResult>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.rank(probe, candidates).into_iter().next()
    }
}

impl Default for FingerprintMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(s: &str) -> FuzzyDigest {
        s.parse().unwrap()
    }

    #[test]
    fn test_best_match_picks_highest_score() {
        let probe = digest("A:FJKKIUKact:FHIGi");
        let known = [
            ("other", "A:zzzzzzzzzz:zzzz"),
            ("close", "A:FJKKIUKacm:FHIGB"),
            ("same", "A:FJKKIUKact:FHIGi"),
        ];
        let best = FingerprintMatcher::default()
            .best_match(&probe, known.iter().copied())
            .unwrap();
        assert_eq!(best.id, "same");
        assert!(best.is_exact());
    }

    #[test]
    fn test_threshold_filters() {
        let probe = digest("A:FJKKIUKact:FHIGi");
        let known = [("close", "A:FJKKIUKacm:FHIGB")];

        let strict = FingerprintMatcher::new(95.0);
        assert!(strict.best_match(&probe, known.iter().copied()).is_none());

        let loose = FingerprintMatcher::new(90.0);
        let found = loose.best_match(&probe, known.iter().copied()).unwrap();
        assert!((found.score - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_candidates_skipped() {
        let probe = digest("A:abc:ab");
        let known = [("broken", "nonsense"), ("ok", "A:abc:ab")];
        let ranked = FingerprintMatcher::default().rank(&probe, known.iter().copied());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "ok");
    }

    #[test]
    fn test_threshold_clamped() {
        assert_eq!(FingerprintMatcher::new(150.0).threshold(), 100.0);
        assert_eq!(FingerprintMatcher::new(-1.0).threshold(), 0.0);
    }
}
