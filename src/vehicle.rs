use nalgebra as na;

use crate::bbox::{BBox, Ltrb};
use crate::geometry;

/// Per-identity accumulator of the counting layer, keyed by track id. Lives
/// for the whole run, even after the underlying motion track has died.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: u32,
    pub name: String,
    pub bbox: BBox<Ltrb>,
    pub reference_point: na::Point2<f32>,
    lane_scores: Vec<(String, u32)>,
    counted: bool,
}

impl Vehicle {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: String::new(),
            bbox: BBox::ltrb(0.0, 0.0, 0.0, 0.0),
            reference_point: na::Point2::new(0.0, 0.0),
            lane_scores: Vec::new(),
            counted: false,
        }
    }

    /// Records the latest classification and box and refreshes the
    /// ground-biased reference point.
    pub fn update(&mut self, name: &str, bbox: BBox<Ltrb>) {
        if self.name != name {
            self.name = name.to_string();
        }

        self.reference_point = bbox.reference_point();
        self.bbox = bbox;
    }

    /// Crossing test with the full box polygon rather than the reference
    /// point, so jitter near the line cannot miss the crossing.
    pub fn is_intersected(&self, count_line: &[na::Point2<f32>]) -> bool {
        geometry::polyline_intersects_polygon(count_line, &self.bbox.corners())
    }

    /// One vote per frame for the single best-matching lane.
    pub fn score_lane(&mut self, lane: &str) {
        match self.lane_scores.iter_mut().find(|(name, _)| name == lane) {
            Some(entry) => entry.1 += 1,
            None => self.lane_scores.push((lane.to_string(), 1)),
        }
    }

    /// Lane with the strictly highest vote count; a tie keeps the lane that
    /// was voted for first.
    pub fn best_lane(&self) -> Option<(&str, u32)> {
        let mut best: Option<(&str, u32)> = None;

        for (name, score) in &self.lane_scores {
            if best.map_or(true, |(_, s)| *score > s) {
                best = Some((name, *score));
            }
        }

        best
    }

    #[inline]
    pub fn is_counted(&self) -> bool {
        self.counted
    }

    /// One-shot latch; never resets.
    #[inline]
    pub fn mark_counted(&mut self) {
        self.counted = true;
    }
}
