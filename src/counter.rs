use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra as na;
use serde_derive::Serialize;

use crate::error::Error;
use crate::geometry;
use crate::lane::LaneSet;
use crate::track::Track;
use crate::vehicle::Vehicle;

/// Aggregate handed to the reporting collaborator once at end of stream.
/// `sum(per_lane) <= total`; a counted vehicle without a single lane vote
/// contributes to the total only.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CountReport {
    pub total: usize,
    pub per_lane: BTreeMap<String, usize>,
}

/// Reads one class label per line, the detector's names-file contract.
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Vec<String>, Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut labels = Vec::new();

    for line in reader.lines() {
        labels.push(line?.trim_end().to_string());
    }

    Ok(labels)
}

/// Owns the lane geometry and the per-identity vehicle records; turns
/// reported tracks into lane votes and one-shot counts.
pub struct LaneCounter {
    lanes: LaneSet,
    labels: Vec<String>,
    pub vehicles: BTreeMap<u32, Vehicle>,
}

impl LaneCounter {
    /// `labels` is the injected read-only class-name table; an id outside it
    /// resolves to an empty label and never fails.
    pub fn new(lanes: LaneSet, labels: Vec<String>) -> Self {
        Self {
            lanes,
            labels,
            vehicles: BTreeMap::new(),
        }
    }

    fn label(&self, class: i32) -> &str {
        usize::try_from(class)
            .ok()
            .and_then(|c| self.labels.get(c))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Nearest scorable lane to the point; declaration order breaks ties.
    fn nearest_lane(&self, point: na::Point2<f32>) -> Option<&str> {
        let mut best: Option<(&str, f32)> = None;

        for lane in &self.lanes.lanes {
            let dist = geometry::polyline_distance(point, &lane.points);

            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((&lane.name, dist));
            }
        }

        best.map(|(name, _)| name)
    }

    /// Folds one frame's reported tracks into the vehicle records.
    pub fn update(&mut self, tracks: &[Track]) {
        for track in tracks {
            let label = self.label(track.class).to_string();
            let winner = self
                .nearest_lane(track.bbox.reference_point())
                .map(str::to_string);

            let vehicle = self
                .vehicles
                .entry(track.track_id)
                .or_insert_with(|| Vehicle::new(track.track_id));

            vehicle.update(&label, track.bbox.clone());

            if let Some(lane) = winner {
                vehicle.score_lane(&lane);
            }

            if !vehicle.is_counted() && vehicle.is_intersected(&self.lanes.count_line.points) {
                vehicle.mark_counted();
            }
        }
    }

    /// Aggregates every vehicle seen during the run, including those whose
    /// motion track has since died.
    pub fn report(&self) -> CountReport {
        let mut total = 0;
        let mut per_lane: BTreeMap<String, usize> = BTreeMap::new();

        for vehicle in self.vehicles.values() {
            if !vehicle.is_counted() {
                continue;
            }

            total += 1;

            if let Some((lane, _)) = vehicle.best_lane() {
                *per_lane.entry(lane.to_string()).or_insert(0) += 1;
            }
        }

        CountReport { total, per_lane }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::lane::{LaneRecord, COUNT_LINE_NAME};

    fn lane(name: &str, points: &[(f32, f32)]) -> LaneRecord {
        LaneRecord {
            name: name.to_string(),
            points: points.to_vec(),
        }
    }

    fn scenario_lanes() -> LaneSet {
        LaneSet::from_records(
            &[
                lane("laneA", &[(0.0, 0.0), (0.0, 100.0)]),
                lane(COUNT_LINE_NAME, &[(50.0, 0.0), (50.0, 100.0)]),
            ],
            COUNT_LINE_NAME,
        )
        .unwrap()
    }

    fn track(id: u32, x: f32) -> Track {
        Track {
            track_id: id,
            class: 1,
            confidence: 0.9,
            time_since_update: 0,
            bbox: BBox::ltrb(x - 5.0, 40.0, x + 5.0, 60.0),
        }
    }

    #[test]
    fn test_single_crossing_is_counted_once() {
        let mut counter = LaneCounter::new(scenario_lanes(), vec!["person".into(), "car".into()]);

        // one object drifting from x=10 across the line at x=50 to x=91
        for step in 0..10 {
            counter.update(&[track(1, 10.0 + 9.0 * step as f32)]);
        }

        let report = counter.report();
        assert_eq!(report.total, 1);
        assert_eq!(report.per_lane.get("laneA"), Some(&1));

        let vehicle = &counter.vehicles[&1];
        assert!(vehicle.is_counted());
        assert_eq!(vehicle.name, "car");
        assert_eq!(vehicle.best_lane().unwrap().0, "laneA");
    }

    #[test]
    fn test_recrossing_does_not_double_count() {
        let mut counter = LaneCounter::new(scenario_lanes(), vec![]);

        counter.update(&[track(1, 50.0)]);
        counter.update(&[track(1, 80.0)]);
        counter.update(&[track(1, 50.0)]);

        assert_eq!(counter.report().total, 1);
    }

    #[test]
    fn test_no_scorable_lanes_counts_without_votes() {
        let lanes = LaneSet::from_records(
            &[lane(COUNT_LINE_NAME, &[(50.0, 0.0), (50.0, 100.0)])],
            COUNT_LINE_NAME,
        )
        .unwrap();
        let mut counter = LaneCounter::new(lanes, vec![]);

        counter.update(&[track(1, 50.0)]);

        let report = counter.report();
        assert_eq!(report.total, 1);
        assert!(report.per_lane.is_empty());
    }

    #[test]
    fn test_vehicles_survive_track_death() {
        let mut counter = LaneCounter::new(scenario_lanes(), vec![]);

        counter.update(&[track(1, 50.0)]);
        // the track is gone from later frames, the vehicle is not
        counter.update(&[track(7, 10.0)]);

        assert_eq!(counter.vehicles.len(), 2);
        assert_eq!(counter.report().total, 1);
    }

    #[test]
    fn test_per_lane_sum_never_exceeds_total() {
        let mut counter = LaneCounter::new(scenario_lanes(), vec![]);

        for id in 1..=3 {
            counter.update(&[track(id, 30.0), track(id + 10, 50.0)]);
        }

        let report = counter.report();
        let lane_sum: usize = report.per_lane.values().sum();
        assert!(lane_sum <= report.total);
    }

    #[test]
    fn test_nearest_lane_wins_the_vote() {
        let lanes = LaneSet::from_records(
            &[
                lane("left", &[(0.0, 0.0), (0.0, 100.0)]),
                lane("right", &[(100.0, 0.0), (100.0, 100.0)]),
                lane(COUNT_LINE_NAME, &[(50.0, 0.0), (50.0, 100.0)]),
            ],
            COUNT_LINE_NAME,
        )
        .unwrap();
        let mut counter = LaneCounter::new(lanes, vec![]);

        counter.update(&[track(1, 90.0)]);

        assert_eq!(counter.vehicles[&1].best_lane().unwrap().0, "right");
    }

    #[test]
    fn test_load_labels_reads_one_name_per_line() {
        let path = std::env::temp_dir().join("lanecount_labels_test.txt");
        std::fs::write(&path, "person\ncar\ntruck\n").unwrap();

        let labels = load_labels(&path).unwrap();
        assert_eq!(labels, vec!["person", "car", "truck"]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unknown_class_gets_empty_label() {
        let mut counter = LaneCounter::new(scenario_lanes(), vec!["person".into()]);

        let mut t = track(1, 10.0);
        t.class = 42;
        counter.update(&[t]);

        assert_eq!(counter.vehicles[&1].name, "");
    }
}
