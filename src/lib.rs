pub mod bbox;
pub mod counter;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod lane;
pub mod tracker;
pub mod vehicle;

mod kalman;
mod track;

pub use counter::{load_labels, CountReport, LaneCounter};
pub use detection::Detection;
pub use error::Error;
pub use lane::{Lane, LaneRecord, LaneSet, COUNT_LINE_NAME};
pub use track::{Track, Tracklet};
pub use tracker::{SortConfig, SortTracker};
pub use vehicle::Vehicle;

/// Tracking-and-counting engine for one camera: tracker output feeds the
/// lane counter within the same frame, strictly in arrival order. Owns all
/// per-run state, so independent instances never share anything.
pub struct Engine {
    tracker: SortTracker,
    counter: LaneCounter,
}

impl Engine {
    pub fn new(config: SortConfig, lanes: LaneSet, labels: Vec<String>) -> Self {
        Self {
            tracker: SortTracker::new(config),
            counter: LaneCounter::new(lanes, labels),
        }
    }

    /// Runs one frame through the tracker and the counter. An empty
    /// detection list is a valid frame and must still be fed through.
    pub fn process_frame(&mut self, detections: &[Detection]) -> Vec<Track> {
        let tracks = self.tracker.update(detections);
        self.counter.update(&tracks);

        tracks
    }

    #[inline]
    pub fn report(&self) -> CountReport {
        self.counter.report()
    }

    #[inline]
    pub fn tracker(&self) -> &SortTracker {
        &self.tracker
    }

    #[inline]
    pub fn counter(&self) -> &LaneCounter {
        &self.counter
    }
}
