//! Temporal deduplication.
//!
//! Candidates are grouped greedily in timestamp order. A group is anchored at
//! its first member and absorbs every following candidate whose timestamp is
//! less than `time_threshold` after the anchor; the next candidate at or past
//! that point opens a new group. Groups are not sliding windows. Each group is
//! reduced to its highest-scoring member (the earliest one on ties).

use tracing::debug;

use kframe_models::Candidate;

/// Collapse temporally adjacent candidates into one representative per group.
///
/// Output is in timestamp order.
pub fn deduplicate(mut candidates: Vec<Candidate>, time_threshold: f64) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let input = candidates.len();
    candidates.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    let mut unique = Vec::new();
    let mut iter = candidates.into_iter();
    let Some(first) = iter.next() else {
        return unique;
    };

    let mut anchor = first.timestamp;
    let mut best = first;

    for candidate in iter {
        if candidate.timestamp - anchor < time_threshold {
            if candidate.score_or_zero() > best.score_or_zero() {
                best = candidate;
            }
        } else {
            unique.push(best);
            anchor = candidate.timestamp;
            best = candidate;
        }
    }
    unique.push(best);

    debug!(input, output = unique.len(), time_threshold, "Deduplicated candidates");
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use kframe_models::BBox;

    fn scored(frame_index: u64, timestamp: f64, score: f64) -> Candidate {
        Candidate {
            frame_index,
            timestamp,
            bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
            confidence: 0.9,
            track_id: None,
            score: Some(score),
        }
    }

    fn frames(out: &[Candidate]) -> Vec<u64> {
        out.iter().map(|c| c.frame_index).collect()
    }

    #[test]
    fn test_empty_and_single() {
        assert!(deduplicate(vec![], 1.0).is_empty());
        let one = deduplicate(vec![scored(5, 2.0, 0.4)], 1.0);
        assert_eq!(frames(&one), vec![5]);
    }

    #[test]
    fn test_close_pair_collapses_to_best() {
        let out = deduplicate(
            vec![scored(10, 0.33, 0.4), scored(11, 0.37, 0.7), scored(50, 1.67, 0.2)],
            1.0,
        );
        assert_eq!(frames(&out), vec![11, 50]);

        let out = deduplicate(
            vec![scored(10, 0.33, 0.9), scored(11, 0.37, 0.7), scored(50, 1.67, 0.2)],
            1.0,
        );
        assert_eq!(frames(&out), vec![10, 50]);
    }

    #[test]
    fn test_group_is_anchored_not_sliding() {
        // 0.9 and 1.8 are each within 1.0 of their predecessor, but 1.8 is
        // past the anchor 0.0 so it opens a new group anchored at 1.8.
        let out = deduplicate(
            vec![
                scored(0, 0.0, 0.1),
                scored(27, 0.9, 0.5),
                scored(54, 1.8, 0.3),
                scored(70, 2.7, 0.9),
            ],
            1.0,
        );
        assert_eq!(frames(&out), vec![27, 70]);
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let out = deduplicate(vec![scored(0, 0.0, 0.5), scored(30, 1.0, 0.1)], 1.0);
        assert_eq!(frames(&out), vec![0, 30]);
    }

    #[test]
    fn test_unsorted_input_and_tie_keeps_earliest() {
        let out = deduplicate(
            vec![scored(40, 5.2, 0.6), scored(30, 5.0, 0.6), scored(1, 0.1, 0.3)],
            1.0,
        );
        assert_eq!(frames(&out), vec![1, 30]);
    }
}
