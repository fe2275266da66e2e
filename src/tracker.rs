use munkres::{solve_assignment, WeightMatrix, Weights};

use crate::bbox::{BBox, Ltrb};
use crate::detection::Detection;
use crate::track::{Track, Tracklet};

const UNMATCHABLE_COST: f32 = 100_000.0;

#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Maximum number of frames to keep alive a track without associated detections
    pub max_age: u32,
    /// Minimum number of associated detections before a track is reported
    pub min_hits: u32,
    /// Minimum IOU between a predicted track box and a detection to accept the pair
    pub iou_threshold: f32,
    /// Report tentative tracks during the first `min_hits` frames of the stream,
    /// so a freshly started stream is not silent while tracks confirm
    pub report_tentative_startup: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            max_age: 15,
            min_hits: 3,
            iou_threshold: 0.3,
            report_tentative_startup: true,
        }
    }
}

/// Turns per-frame detections into temporally consistent identities:
/// predict -> associate -> correct -> manage lifecycle, once per frame.
pub struct SortTracker {
    pub config: SortConfig,
    pub tracklets: Vec<Tracklet>,
    next_id: u32,
    frames: u64,
}

impl SortTracker {
    pub fn new(config: SortConfig) -> Self {
        Self {
            config,
            tracklets: Vec::with_capacity(64),
            next_id: 1,
            frames: 0,
        }
    }

    /// Minimum-cost pairing between predicted boxes and detections over
    /// 1 - IOU; pairs under the IOU threshold stay unmatched on both sides.
    fn associate(
        &self,
        predictions: &[BBox<Ltrb>],
        detections: &[Detection],
    ) -> Vec<(usize, usize)> {
        if predictions.is_empty() || detections.is_empty() {
            return Vec::new();
        }

        let n = predictions.len().max(detections.len());

        let cost_fn = |(r, c): (usize, usize)| {
            if r < predictions.len() && c < detections.len() {
                1.0 - predictions[r].iou(&detections[c].bbox())
            } else {
                UNMATCHABLE_COST
            }
        };

        let mut mat = WeightMatrix::from_fn(n, &cost_fn);

        let costs = WeightMatrix::from_fn(n, &cost_fn);
        let mut matched = Vec::new();

        if let Ok(pairs) = solve_assignment(&mut mat) {
            for pair in pairs {
                if pair.row < predictions.len() && pair.column < detections.len() {
                    let iou = 1.0 - costs.element_at(pair);

                    if iou >= self.config.iou_threshold {
                        matched.push((pair.row, pair.column));
                    }
                }
            }
        } else {
            log::warn!("assignment could not be solved, treating frame as unmatched");
        }

        matched
    }

    /// Advances every track one frame and folds the detections in. An empty
    /// detection list is a valid frame and still ages tracks out.
    pub fn update(&mut self, detections: &[Detection]) -> Vec<Track> {
        self.frames += 1;

        let detections: Vec<Detection> = detections
            .iter()
            .filter(|det| {
                let ok = det.is_valid();

                if !ok {
                    log::warn!("dropping malformed detection {:?}", det);
                }

                ok
            })
            .copied()
            .collect();

        for tracklet in &mut self.tracklets {
            tracklet.predict();
        }

        // a filter that walked the box into a degenerate state cannot be
        // matched or reported any more
        self.tracklets.retain(|t| {
            let ok = t.bbox().is_valid();

            if !ok {
                log::warn!("track {} diverged, dropping", t.id);
            }

            ok
        });

        let predictions: Vec<BBox<Ltrb>> = self.tracklets.iter().map(|t| t.bbox()).collect();
        let matched = self.associate(&predictions, &detections);

        let mut matched_tracks = vec![false; self.tracklets.len()];
        let mut matched_dets = vec![false; detections.len()];
        let mut corrupted = Vec::new();

        let min_hits = self.config.min_hits;

        for &(ti, di) in &matched {
            matched_tracks[ti] = true;
            matched_dets[di] = true;

            if let Err(err) = self.tracklets[ti].update(&detections[di], min_hits) {
                log::warn!("track {}: {}", self.tracklets[ti].id, err);
                corrupted.push(self.tracklets[ti].id);
            }
        }

        for (i, tracklet) in self.tracklets.iter_mut().enumerate() {
            if !matched_tracks[i] {
                tracklet.mark_missed();
            }
        }

        let max_age = self.config.max_age;
        self.tracklets
            .retain(|t| t.time_since_update <= max_age && !corrupted.contains(&t.id));

        for (i, det) in detections.iter().enumerate() {
            if !matched_dets[i] {
                let id = self.next_id;
                self.next_id += 1;

                self.tracklets.push(Tracklet::new(id, det, min_hits));
            }
        }

        self.tracks()
    }

    /// Currently reported tracks: matched this frame and confirmed, plus
    /// (when configured) tentative ones inside the startup window.
    pub fn tracks(&self) -> Vec<Track> {
        let startup =
            self.config.report_tentative_startup && self.frames <= self.config.min_hits as u64;

        self.tracklets
            .iter()
            .filter(|t| t.time_since_update == 0 && (t.confirmed || startup))
            .map(Into::into)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_age: u32, min_hits: u32, startup: bool) -> SortConfig {
        SortConfig {
            max_age,
            min_hits,
            iou_threshold: 0.3,
            report_tentative_startup: startup,
        }
    }

    fn det(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection::new(x1, y1, x2, y2, 0.9, 2)
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut tracker = SortTracker::new(config(1, 1, false));
        let d = det(0.0, 0.0, 10.0, 10.0);

        tracker.update(&[d]);
        assert_eq!(tracker.tracklets[0].id, 1);

        // starve the track until it dies
        tracker.update(&[]);
        tracker.update(&[]);
        assert!(tracker.tracklets.is_empty());

        // a new object in the same place gets a fresh id
        let tracks = tracker.update(&[d]);
        assert_eq!(tracks[0].track_id, 2);
    }

    #[test]
    fn test_track_dies_after_max_age_missed_frames() {
        let mut tracker = SortTracker::new(config(2, 1, false));

        tracker.update(&[det(0.0, 0.0, 10.0, 10.0)]);
        tracker.update(&[]);
        tracker.update(&[]);
        assert_eq!(tracker.tracklets.len(), 1);

        tracker.update(&[]);
        assert!(tracker.tracklets.is_empty());
    }

    #[test]
    fn test_confirmation_threshold_gates_reporting() {
        let mut tracker = SortTracker::new(config(5, 3, false));
        let d = det(0.0, 0.0, 10.0, 10.0);

        assert!(tracker.update(&[d]).is_empty());
        assert!(tracker.update(&[d]).is_empty());

        let tracks = tracker.update(&[d]);
        assert_eq!(tracks.len(), 1);
        assert!(tracker.tracklets[0].confirmed);
    }

    #[test]
    fn test_startup_window_reports_tentative_tracks() {
        let mut tracker = SortTracker::new(config(5, 3, true));

        let tracks = tracker.update(&[det(0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(tracks.len(), 1);
        assert!(!tracker.tracklets[0].confirmed);
    }

    #[test]
    fn test_empty_frame_ages_without_spurious_births() {
        let mut tracker = SortTracker::new(config(10, 1, false));

        tracker.update(&[det(0.0, 0.0, 10.0, 10.0), det(50.0, 50.0, 60.0, 60.0)]);
        let tracks = tracker.update(&[]);

        assert!(tracks.is_empty());
        assert_eq!(tracker.tracklets.len(), 2);
        assert!(tracker.tracklets.iter().all(|t| t.time_since_update == 1));
    }

    #[test]
    fn test_malformed_detections_are_dropped() {
        let mut tracker = SortTracker::new(config(5, 1, false));

        tracker.update(&[
            det(10.0, 0.0, 0.0, 10.0),
            det(0.0, 0.0, f32::NAN, 10.0),
        ]);

        assert!(tracker.tracklets.is_empty());
    }

    #[test]
    fn test_identity_survives_a_detection_gap() {
        let mut tracker = SortTracker::new(config(3, 1, false));
        let d = det(0.0, 0.0, 10.0, 10.0);

        tracker.update(&[d]);
        tracker.update(&[]);

        let tracks = tracker.update(&[d]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].track_id, 1);
        assert_eq!(tracker.tracklets.len(), 1);
    }

    #[test]
    fn test_two_objects_keep_their_identities() {
        let mut tracker = SortTracker::new(config(5, 1, false));

        tracker.update(&[det(0.0, 0.0, 10.0, 10.0), det(100.0, 100.0, 110.0, 110.0)]);

        // input order swapped, association goes by overlap
        tracker.update(&[det(102.0, 100.0, 112.0, 110.0), det(2.0, 0.0, 12.0, 10.0)]);

        let far = tracker.tracklets.iter().find(|t| t.id == 2).unwrap();
        assert!(far.bbox().left() > 50.0);
        assert_eq!(far.hit_streak, 2);
    }
}
