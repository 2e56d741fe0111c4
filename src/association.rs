use nalgebra as na;

use crate::bbox::BBox;
use crate::detection::Detection;

/// One track as the matcher sees it: identity plus the Kalman prior.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: u32,
    pub pred_box: BBox,
    pub pred_center: na::Point2<f32>,
}

/// Outcome of one frame of detection-to-track assignment.
#[derive(Debug)]
pub struct Assignment {
    /// `(detection index, track id)` pairs.
    pub matches: Vec<(usize, u32)>,
    pub unmatched_tracks: Vec<u32>,
    pub unmatched_detections: Vec<usize>,
}

/// Greedy assignment, processed in detection order. For each detection the
/// still-unassigned track with the highest IoU against its predicted box
/// wins, ties broken by the smaller center distance; the pair is accepted
/// when the IoU clears `min_iou` or the centers are within `max_distance`.
/// An assigned track leaves the pool, so later detections cannot steal it.
pub fn associate(
    detections: &[Detection],
    candidates: &[Candidate],
    min_iou: f32,
    max_distance: f32,
) -> Assignment {
    let mut matches = Vec::new();
    let mut track_free = vec![true; candidates.len()];
    let mut det_assigned = vec![false; detections.len()];

    for (det_idx, det) in detections.iter().enumerate() {
        let det_center = det.center();

        let mut best = None;
        let mut best_iou = 0.0f32;
        let mut best_dist = f32::INFINITY;

        for (cnd_idx, cnd) in candidates.iter().enumerate() {
            if !track_free[cnd_idx] {
                continue;
            }

            let iou = det.bbox.iou(&cnd.pred_box);
            let dist = na::distance(&det_center, &cnd.pred_center);

            if iou > best_iou || (iou == best_iou && dist < best_dist) {
                best_iou = iou;
                best_dist = dist;
                best = Some(cnd_idx);
            }
        }

        if let Some(cnd_idx) = best {
            if best_iou >= min_iou || best_dist <= max_distance {
                matches.push((det_idx, candidates[cnd_idx].id));
                track_free[cnd_idx] = false;
                det_assigned[det_idx] = true;
            }
        }
    }

    let unmatched_tracks = candidates
        .iter()
        .zip(&track_free)
        .filter_map(|(cnd, &free)| free.then(|| cnd.id))
        .collect();

    let unmatched_detections = det_assigned
        .iter()
        .enumerate()
        .filter_map(|(idx, &assigned)| (!assigned).then(|| idx))
        .collect();

    Assignment {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: i32, y: i32, w: i32, h: i32) -> Detection {
        Detection::new(BBox::new(x, y, w, h))
    }

    fn candidate(id: u32, bbox: BBox) -> Candidate {
        Candidate {
            id,
            pred_box: bbox,
            pred_center: bbox.center(),
        }
    }

    #[test]
    fn highest_iou_wins() {
        let detections = [det(0, 0, 10, 10)];
        let candidates = [
            candidate(1, BBox::new(6, 0, 10, 10)),
            candidate(2, BBox::new(1, 0, 10, 10)),
        ];

        let a = associate(&detections, &candidates, 0.15, 120.0);

        assert_eq!(a.matches, vec![(0, 2)]);
        assert_eq!(a.unmatched_tracks, vec![1]);
        assert!(a.unmatched_detections.is_empty());
    }

    #[test]
    fn distance_breaks_iou_ties() {
        // both candidates have zero IoU; the nearer one is picked
        let detections = [det(0, 0, 4, 4)];
        let candidates = [
            candidate(1, BBox::new(40, 0, 4, 4)),
            candidate(2, BBox::new(20, 0, 4, 4)),
        ];

        let a = associate(&detections, &candidates, 0.15, 120.0);

        assert_eq!(a.matches, vec![(0, 2)]);
    }

    #[test]
    fn distance_fallback_gates_acceptance() {
        let detections = [det(0, 0, 4, 4)];
        let candidates = [candidate(1, BBox::new(100, 0, 4, 4))];

        let near = associate(&detections, &candidates, 0.15, 120.0);
        assert_eq!(near.matches, vec![(0, 1)]);

        let far = associate(&detections, &candidates, 0.15, 50.0);
        assert!(far.matches.is_empty());
        assert_eq!(far.unmatched_tracks, vec![1]);
        assert_eq!(far.unmatched_detections, vec![0]);
    }

    #[test]
    fn greedy_matching_is_exclusive() {
        // two detections over one track: the first one takes it
        let detections = [det(0, 0, 10, 10), det(1, 0, 10, 10)];
        let candidates = [candidate(1, BBox::new(0, 0, 10, 10))];

        let a = associate(&detections, &candidates, 0.15, 5.0);

        assert_eq!(a.matches, vec![(0, 1)]);
        assert_eq!(a.unmatched_detections, vec![1]);
        assert!(a.unmatched_tracks.is_empty());
    }

    #[test]
    fn no_candidates_leaves_all_detections_unmatched() {
        let detections = [det(0, 0, 10, 10), det(50, 50, 10, 10)];

        let a = associate(&detections, &[], 0.15, 120.0);

        assert!(a.matches.is_empty());
        assert_eq!(a.unmatched_detections, vec![0, 1]);
    }
}
