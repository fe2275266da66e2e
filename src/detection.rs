use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};

/// Contains the (x1,y1)-(x2,y2) corners of the detected box in the frame's
/// pixel coordinate space, plus class and confidence from the external detector
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    #[serde(rename = "p")]
    pub score: f32,
    #[serde(rename = "c")]
    pub class: i32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class: i32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            score,
            class,
        }
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltrb> {
        BBox::ltrb(self.x1, self.y1, self.x2, self.y2)
    }

    /// Rejects non-finite coordinates and inverted boxes.
    #[inline]
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2, self.score]
            .iter()
            .all(|v| v.is_finite())
            && self.x2 > self.x1
            && self.y2 > self.y1
    }
}
