//! Top-N selection by score.

use kframe_models::Candidate;

/// Keep at most `max_frames` candidates, highest score first.
///
/// The sort is stable, so equal scores keep their input order.
pub fn select_top(mut candidates: Vec<Candidate>, max_frames: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score_or_zero().total_cmp(&a.score_or_zero()));
    candidates.truncate(max_frames);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use kframe_models::BBox;

    fn scored(frame_index: u64, score: f64) -> Candidate {
        Candidate {
            frame_index,
            timestamp: frame_index as f64 / 30.0,
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            confidence: 0.9,
            track_id: None,
            score: Some(score),
        }
    }

    #[test]
    fn test_orders_by_score_and_caps() {
        let input = vec![scored(1, 0.2), scored(2, 0.9), scored(3, 0.5), scored(4, 0.7)];
        let out = select_top(input, 3);
        let frames: Vec<u64> = out.iter().map(|c| c.frame_index).collect();
        assert_eq!(frames, vec![2, 4, 3]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let input = vec![scored(9, 0.5), scored(3, 0.5), scored(6, 0.5)];
        let frames: Vec<u64> = select_top(input, 10).iter().map(|c| c.frame_index).collect();
        assert_eq!(frames, vec![9, 3, 6]);
    }

    #[test]
    fn test_never_exceeds_max_frames() {
        let input: Vec<Candidate> = (0..50).map(|i| scored(i, (i % 7) as f64 / 7.0)).collect();
        for max in [1, 5, 49, 50, 80] {
            assert!(select_top(input.clone(), max).len() <= max);
        }
        assert!(select_top(vec![], 5).is_empty());
    }
}
