//! Heuristic pairwise relation classification.
//!
//! The entire decision is a pure table over two similarity scores and two
//! thresholds (`high > low`):
//!
//! | problem sim | method sim       | label |
//! |-------------|------------------|-------|
//! | > high      | > high           | Potential-Duplicate-or-Incremental |
//! | > high      | < low            | Alternative-Approach |
//! | > high      | low..=high       | Related-Work-Moderate-Overlap |
//! | < low       | > high           | Method-Reuse |
//! | < low       | <= high          | Likely-Unrelated |
//! | low..=high  | any              | Loosely-Related |
//!
//! The comparisons are strict, so a score exactly at a threshold falls into
//! the middle band.

use papergraph_shared::{PaperId, RelationEdge, RelationLabel, Thresholds};

/// Provenance tag for edges produced by this classifier.
pub const HEURISTIC_PROVENANCE: &str = "similarity-heuristic";

/// Classify one pair of papers from their problem/method similarities.
///
/// The table is exhaustive and mutually exclusive, so exactly one label
/// comes back from this path; the list shape exists for callers that
/// combine several evidence sources into simultaneous candidates.
pub fn classify(
    problem_sim: f32,
    method_sim: f32,
    thresholds: &Thresholds,
) -> Vec<RelationLabel> {
    let Thresholds { high, low } = *thresholds;

    let label = if problem_sim > high {
        if method_sim > high {
            RelationLabel::PotentialDuplicateOrIncremental
        } else if method_sim < low {
            RelationLabel::AlternativeApproach
        } else {
            RelationLabel::RelatedWorkModerateOverlap
        }
    } else if problem_sim < low {
        if method_sim > high {
            RelationLabel::MethodReuse
        } else {
            RelationLabel::LikelyUnrelated
        }
    } else {
        RelationLabel::LooselyRelated
    };

    vec![label]
}

/// Build the relation edge for one classified pair.
///
/// Confidence is the arithmetic mean of the two similarities; the reasoning
/// text cites both scores.
pub fn edge_for_pair(
    source: &PaperId,
    target: &PaperId,
    problem_sim: f32,
    method_sim: f32,
    thresholds: &Thresholds,
) -> RelationEdge {
    let label = classify(problem_sim, method_sim, thresholds)[0];

    RelationEdge {
        source: source.clone(),
        target: target.clone(),
        label: label.as_str().to_string(),
        confidence: (problem_sim + method_sim) / 2.0,
        reasoning: format!(
            "Problem similarity {problem_sim:.2}, method similarity {method_sim:.2}."
        ),
        provenance: HEURISTIC_PROVENANCE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_for(p: f32, m: f32) -> RelationLabel {
        let labels = classify(p, m, &Thresholds::default());
        assert_eq!(labels.len(), 1);
        labels[0]
    }

    #[test]
    fn same_problem_same_method() {
        assert_eq!(
            label_for(0.9, 0.9),
            RelationLabel::PotentialDuplicateOrIncremental
        );
    }

    #[test]
    fn same_problem_different_method() {
        assert_eq!(label_for(0.9, 0.3), RelationLabel::AlternativeApproach);
    }

    #[test]
    fn same_problem_moderate_method() {
        assert_eq!(
            label_for(0.9, 0.6),
            RelationLabel::RelatedWorkModerateOverlap
        );
    }

    #[test]
    fn different_problem_same_method() {
        assert_eq!(label_for(0.3, 0.9), RelationLabel::MethodReuse);
    }

    #[test]
    fn different_problem_different_method() {
        assert_eq!(label_for(0.3, 0.4), RelationLabel::LikelyUnrelated);
    }

    #[test]
    fn moderate_problem_overlap() {
        assert_eq!(label_for(0.6, 0.6), RelationLabel::LooselyRelated);
    }

    #[test]
    fn problem_exactly_at_high_is_middle_band() {
        // Comparisons are strict: 0.75 is not > 0.75.
        assert_eq!(label_for(0.75, 0.9), RelationLabel::LooselyRelated);
        assert_eq!(label_for(0.75, 0.1), RelationLabel::LooselyRelated);
    }

    #[test]
    fn problem_exactly_at_low_is_middle_band() {
        assert_eq!(label_for(0.5, 0.9), RelationLabel::LooselyRelated);
    }

    #[test]
    fn method_at_thresholds_within_high_problem_row() {
        // m == high and m == low both land in the moderate-overlap row.
        assert_eq!(
            label_for(0.9, 0.75),
            RelationLabel::RelatedWorkModerateOverlap
        );
        assert_eq!(
            label_for(0.9, 0.5),
            RelationLabel::RelatedWorkModerateOverlap
        );
    }

    #[test]
    fn low_problem_row_includes_method_at_high() {
        // m == high is not > high, so this is Likely-Unrelated.
        assert_eq!(label_for(0.3, 0.75), RelationLabel::LikelyUnrelated);
    }

    #[test]
    fn custom_thresholds_shift_the_bands() {
        let t = Thresholds {
            high: 0.9,
            low: 0.2,
        };
        let labels = classify(0.8, 0.8, &t);
        assert_eq!(labels[0], RelationLabel::LooselyRelated);
    }

    #[test]
    fn edge_carries_mean_confidence_and_cited_scores() {
        let a = PaperId::new("a");
        let b = PaperId::new("b");
        let edge = edge_for_pair(&a, &b, 0.9, 0.2, &Thresholds::default());

        assert_eq!(edge.label, "Alternative-Approach");
        assert!((edge.confidence - 0.55).abs() < 1e-6);
        assert!(edge.reasoning.contains("0.90"));
        assert!(edge.reasoning.contains("0.20"));
        assert_eq!(edge.provenance, HEURISTIC_PROVENANCE);
        assert_eq!(edge.source, a);
        assert_eq!(edge.target, b);
    }
}
