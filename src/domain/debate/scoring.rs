//! Score aggregation math for the LCR model.
//!
//! Each sub-score is the arithmetic mean over a participant's analyzed
//! turns; the weighted total combines them with fixed weights
//! (Logic 40%, Credibility 35%, Rhetoric 25%).

use crate::domain::debate::{ParticipantScore, ScoreCard, Turn};

pub const LOGIC_WEIGHT: f64 = 0.40;
pub const CREDIBILITY_WEIGHT: f64 = 0.35;
pub const RHETORIC_WEIGHT: f64 = 0.25;

/// Cap on pooled strengths/weaknesses carried into the final result.
const POOLED_FEEDBACK_LIMIT: usize = 5;

/// Canned improvement suggestions attached to every scored debater.
const IMPROVEMENTS: [&str; 3] = [
    "Focus on providing more evidence to support your claims",
    "Strengthen your logical structure and transitions",
    "Enhance your rhetorical techniques for greater persuasion",
];

/// Mean LCR sub-scores over the analyzed turns among `turns`.
///
/// Unanalyzed turns are ignored; a participant with no analyzed turns gets
/// all zeros.
pub fn aggregate(turns: &[&Turn]) -> ScoreCard {
    let analyzed: Vec<_> = turns.iter().filter_map(|t| t.feedback.as_ref()).collect();
    if analyzed.is_empty() {
        return ScoreCard::default();
    }
    let count = analyzed.len() as f64;
    ScoreCard {
        logic: analyzed.iter().map(|f| f.logic).sum::<f64>() / count,
        credibility: analyzed.iter().map(|f| f.credibility).sum::<f64>() / count,
        rhetoric: analyzed.iter().map(|f| f.rhetoric).sum::<f64>() / count,
    }
}

/// The single scalar ranking score for a score card.
pub fn weighted_total(card: &ScoreCard) -> f64 {
    card.logic * LOGIC_WEIGHT + card.credibility * CREDIBILITY_WEIGHT + card.rhetoric * RHETORIC_WEIGHT
}

/// Builds the result-facing score entry from a card.
pub fn participant_score(card: &ScoreCard) -> ParticipantScore {
    ParticipantScore {
        logic: card.logic,
        credibility: card.credibility,
        rhetoric: card.rhetoric,
        weighted_total: weighted_total(card),
    }
}

/// Pools strengths and weaknesses across a participant's analyzed turns.
///
/// Duplicates are dropped keeping first-seen order, capped at five each,
/// so the output is deterministic for a given turn sequence.
pub fn pooled_feedback(turns: &[&Turn]) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for feedback in turns.iter().filter_map(|t| t.feedback.as_ref()) {
        for s in &feedback.strengths {
            if strengths.len() < POOLED_FEEDBACK_LIMIT && !strengths.contains(s) {
                strengths.push(s.clone());
            }
        }
        for w in &feedback.weaknesses {
            if weaknesses.len() < POOLED_FEEDBACK_LIMIT && !weaknesses.contains(w) {
                weaknesses.push(w.clone());
            }
        }
    }
    (strengths, weaknesses)
}

/// The canned improvement suggestions.
pub fn improvements() -> Vec<String> {
    IMPROVEMENTS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::debate::TurnFeedback;
    use crate::domain::foundation::{ParticipantId, RoomId};
    use proptest::prelude::*;

    fn turn_with_feedback(logic: f64, credibility: f64, rhetoric: f64) -> Turn {
        let mut turn = Turn::new(RoomId::new(), ParticipantId::new(), "arg", 1, 1);
        turn.feedback = Some(TurnFeedback {
            logic,
            credibility,
            rhetoric,
            commentary: String::new(),
            strengths: vec![],
            weaknesses: vec![],
        });
        turn
    }

    #[test]
    fn weighted_total_matches_fixed_weights() {
        let card = ScoreCard::new(8.0, 6.0, 4.0);
        // 0.40*8 + 0.35*6 + 0.25*4 = 6.3
        assert!((weighted_total(&card) - 6.3).abs() < 1e-9);
    }

    #[test]
    fn aggregate_with_no_turns_is_zero() {
        assert_eq!(aggregate(&[]), ScoreCard::default());
    }

    #[test]
    fn aggregate_ignores_unanalyzed_turns() {
        let analyzed = turn_with_feedback(8.0, 6.0, 4.0);
        let unanalyzed = Turn::new(RoomId::new(), ParticipantId::new(), "arg", 1, 2);
        let card = aggregate(&[&analyzed, &unanalyzed]);
        assert_eq!(card, ScoreCard::new(8.0, 6.0, 4.0));
    }

    #[test]
    fn aggregate_is_arithmetic_mean() {
        let a = turn_with_feedback(8.0, 6.0, 4.0);
        let b = turn_with_feedback(6.0, 8.0, 8.0);
        let card = aggregate(&[&a, &b]);
        assert_eq!(card, ScoreCard::new(7.0, 7.0, 6.0));
    }

    #[test]
    fn pooled_feedback_dedupes_and_caps() {
        let mut turns = Vec::new();
        for i in 0..4 {
            let mut t = turn_with_feedback(7.0, 7.0, 7.0);
            t.feedback.as_mut().unwrap().strengths =
                vec!["Clear argument".to_string(), format!("Strength {}", i)];
            t.feedback.as_mut().unwrap().weaknesses = vec!["Needs evidence".to_string()];
            turns.push(t);
        }
        let refs: Vec<&Turn> = turns.iter().collect();
        let (strengths, weaknesses) = pooled_feedback(&refs);

        assert_eq!(strengths.len(), 5);
        assert_eq!(strengths[0], "Clear argument");
        assert_eq!(weaknesses, vec!["Needs evidence".to_string()]);
    }

    proptest! {
        #[test]
        fn weighted_total_bounded_by_extremes(
            logic in 0.0f64..=10.0,
            credibility in 0.0f64..=10.0,
            rhetoric in 0.0f64..=10.0,
        ) {
            let total = weighted_total(&ScoreCard::new(logic, credibility, rhetoric));
            let lo = logic.min(credibility).min(rhetoric);
            let hi = logic.max(credibility).max(rhetoric);
            prop_assert!(total >= lo - 1e-9);
            prop_assert!(total <= hi + 1e-9);
        }

        #[test]
        fn weights_sum_to_one_so_uniform_scores_fix_total(score in 0.0f64..=10.0) {
            let total = weighted_total(&ScoreCard::new(score, score, score));
            prop_assert!((total - score).abs() < 1e-9);
        }
    }
}
