use crate::bbox::{BBox, Ltrb};
use crate::detection::Detection;
use crate::error::Error;
use crate::kalman::{KalmanFilter, Measurement};

/// Single-object motion state and lifecycle counters, owned by the tracker.
/// Lifecycle runs Tentative -> Confirmed -> Dead; `confirmed` never resets.
#[derive(Debug, Clone)]
pub struct Tracklet {
    pub id: u32,
    pub class: i32,
    pub confidence: f32,
    pub age: u32,
    pub hits: u32,
    pub hit_streak: u32,
    pub time_since_update: u32,
    pub confirmed: bool,
    kf: KalmanFilter,
}

impl Tracklet {
    pub fn new(id: u32, det: &Detection, min_hits: u32) -> Self {
        let z = Measurement::from_column_slice(det.bbox().as_xysr().as_slice());

        Self {
            id,
            class: det.class,
            confidence: det.score,
            age: 1,
            hits: 1,
            hit_streak: 1,
            time_since_update: 0,
            confirmed: 1 >= min_hits,
            kf: KalmanFilter::new(z),
        }
    }

    /// Advance the filter one time step and age the tracklet.
    pub fn predict(&mut self) -> BBox<Ltrb> {
        // keep the scale positive one step ahead
        if self.kf.x[6] + self.kf.x[2] <= 0.0 {
            self.kf.x[6] = 0.0;
        }

        self.kf.predict();
        self.age += 1;
        self.time_since_update += 1;

        self.bbox()
    }

    /// Correction step with the matched detection box.
    pub fn update(&mut self, det: &Detection, min_hits: u32) -> Result<(), Error> {
        let z = Measurement::from_column_slice(det.bbox().as_xysr().as_slice());
        self.kf.update(z)?;

        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        self.class = det.class;
        self.confidence = det.score;

        if self.hit_streak >= min_hits {
            self.confirmed = true;
        }

        Ok(())
    }

    pub fn mark_missed(&mut self) {
        self.hit_streak = 0;
    }

    #[inline]
    pub fn bbox(&self) -> BBox<Ltrb> {
        let z = self.kf.measurement();

        BBox::xysr(z[0], z[1], z[2], z[3]).as_ltrb()
    }
}

/// Per-frame record handed to downstream consumers for a reported track.
#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: u32,
    pub class: i32,
    pub confidence: f32,
    pub time_since_update: u32,
    pub bbox: BBox<Ltrb>,
}

impl From<&Tracklet> for Track {
    fn from(t: &Tracklet) -> Track {
        Track {
            track_id: t.id,
            class: t.class,
            confidence: t.confidence,
            time_since_update: t.time_since_update,
            bbox: t.bbox(),
        }
    }
}
