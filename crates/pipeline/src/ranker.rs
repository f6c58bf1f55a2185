//! Final ordering of surviving candidates.

use inventory::Candidate;
use std::cmp::Ordering;

/// Orders candidates by `success_rate`, highest first.
///
/// The sort is stable: candidates with equal scores keep their input order.
/// There is deliberately no secondary key.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessRateRanker;

impl SuccessRateRanker {
    pub fn rank(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.sort_by(|a, b| {
            b.success_rate
                .partial_cmp(&a.success_rate)
                .unwrap_or(Ordering::Equal)
        });
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending() {
        let candidates = vec![
            Candidate::new(1, "footer".into(), 0.5),
            Candidate::new(2, "footer".into(), 0.9),
            Candidate::new(3, "footer".into(), 0.1),
        ];

        let ranked = SuccessRateRanker.rank(candidates);
        let scores: Vec<f64> = ranked.iter().map(|c| c.success_rate).collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.1]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![
            Candidate::new(7, "footer".into(), 0.3),
            Candidate::new(2, "footer".into(), 0.8),
            Candidate::new(5, "footer".into(), 0.3),
            Candidate::new(1, "footer".into(), 0.3),
        ];

        let ranked = SuccessRateRanker.rank(candidates);
        let ids: Vec<u64> = ranked.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 7, 5, 1]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(SuccessRateRanker.rank(Vec::new()).is_empty());
    }
}
