//! Shared normalization helpers for score plugins whose raw scores do not already span
//! `[MIN_NODE_SCORE, MAX_NODE_SCORE]`.

use crate::core::scheduler::status::{NodeScoreList, MAX_NODE_SCORE, MIN_NODE_SCORE};

/// Linearly rescales scores so the lowest becomes `MIN_NODE_SCORE` and the highest
/// `MAX_NODE_SCORE`. With `reverse` the lowest raw score gets the highest result.
/// If all scores are equal every node gets `MAX_NODE_SCORE`.
pub fn rescale_linear(scores: &mut NodeScoreList, reverse: bool) {
    let Some(min) = scores.iter().map(|s| s.score).min() else {
        return;
    };
    let max = scores.iter().map(|s| s.score).max().unwrap_or(min);

    for node_score in scores.iter_mut() {
        if min == max {
            node_score.score = MAX_NODE_SCORE;
            continue;
        }
        // Widened so extreme raw scores can not overflow. The result lies in the score range.
        let scaled = i128::from(MIN_NODE_SCORE)
            + (i128::from(node_score.score) - i128::from(min))
                * i128::from(MAX_NODE_SCORE - MIN_NODE_SCORE)
                / (i128::from(max) - i128::from(min));
        let scaled = scaled as i64;
        node_score.score = if reverse {
            MAX_NODE_SCORE - scaled + MIN_NODE_SCORE
        } else {
            scaled
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::status::NodeScore;

    fn scores(raw: &[i64]) -> NodeScoreList {
        raw.iter()
            .enumerate()
            .map(|(idx, &score)| NodeScore {
                name: format!("node{}", idx),
                score,
            })
            .collect()
    }

    fn values(scores: &NodeScoreList) -> Vec<i64> {
        scores.iter().map(|s| s.score).collect()
    }

    #[test]
    fn test_narrow_distribution_spans_full_range() {
        let mut list = scores(&[10, 12, 14]);
        rescale_linear(&mut list, false);
        assert_eq!(values(&list), vec![0, 50, 100]);
    }

    #[test]
    fn test_reverse() {
        let mut list = scores(&[10, 12, 14]);
        rescale_linear(&mut list, true);
        assert_eq!(values(&list), vec![100, 50, 0]);
    }

    #[test]
    fn test_equal_scores_get_max() {
        let mut list = scores(&[3, 3]);
        rescale_linear(&mut list, false);
        assert_eq!(values(&list), vec![MAX_NODE_SCORE, MAX_NODE_SCORE]);
    }

    #[test]
    fn test_extreme_raw_scores() {
        let mut list = scores(&[i64::MIN, 0, i64::MAX]);
        rescale_linear(&mut list, false);
        assert_eq!(values(&list), vec![0, 50, 100]);

        let mut list = scores(&[i64::MAX, i64::MIN]);
        rescale_linear(&mut list, true);
        assert_eq!(values(&list), vec![0, 100]);
    }

    #[test]
    fn test_empty_list_is_untouched() {
        let mut list = NodeScoreList::new();
        rescale_linear(&mut list, false);
        assert!(list.is_empty());
    }
}
