use nalgebra as na;
use serde::{Deserialize, Serialize};
use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// X-y-scale-ratio format, contains coordinates of the center of bbox,
/// its area (scale) and aspect ratio; the measurement space of the motion filter
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Xysr;
impl BBoxFormat for Xysr {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BBox<F: BBoxFormat + Serialize + Deserialize<'static> + PartialEq>(
    [f32; 4],
    PhantomData<F>,
);

impl<F: BBoxFormat + Serialize + Deserialize<'static> + PartialEq> From<BBox<F>> for [f32; 4] {
    fn from(bbox: BBox<F>) -> Self {
        bbox.0
    }
}

impl<F: BBoxFormat + Serialize + Deserialize<'static> + PartialEq> BBox<F> {
    #[inline]
    pub fn as_slice(&self) -> &[f32; 4] {
        &self.0
    }

    // Use carefully when you REALLY sure that slice have needed format
    #[inline(always)]
    pub fn assigned(slice: &[f32; 4]) -> Self {
        BBox(*slice, Default::default())
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], Default::default())
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2] - self.0[0]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3] - self.0[1]
    }

    #[inline(always)]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    #[inline(always)]
    pub fn cx(&self) -> f32 {
        (self.0[0] + self.0[2]) / 2.0
    }

    #[inline(always)]
    pub fn cy(&self) -> f32 {
        (self.0[1] + self.0[3]) / 2.0
    }

    #[inline]
    pub fn as_xysr(&self) -> BBox<Xysr> {
        self.into()
    }

    /// Finite coordinates with positive extent on both axes.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|v| v.is_finite()) && self.width() > 0.0 && self.height() > 0.0
    }

    pub fn iou(&self, other: &BBox<Ltrb>) -> f32 {
        let i_xmin = self.left().max(other.left());
        let i_ymin = self.top().max(other.top());
        let i_xmax = self.right().min(other.right());
        let i_ymax = self.bottom().min(other.bottom());

        let i_area = (i_xmax - i_xmin).max(0.) * (i_ymax - i_ymin).max(0.);
        let union = self.area() + other.area() - i_area;

        if union > 0.0 {
            i_area / union
        } else {
            0.0
        }
    }

    /// Corners in drawing order, left-top first.
    #[inline]
    pub fn corners(&self) -> [na::Point2<f32>; 4] {
        [
            na::Point2::new(self.0[0], self.0[1]),
            na::Point2::new(self.0[2], self.0[1]),
            na::Point2::new(self.0[2], self.0[3]),
            na::Point2::new(self.0[0], self.0[3]),
        ]
    }

    /// Point lying between the box centroid and its bottom edge,
    /// biased toward the ground contact of the object.
    #[inline]
    pub fn reference_point(&self) -> na::Point2<f32> {
        let c = crate::geometry::centroid(&self.corners());

        na::Point2::new(c.x, c.y + (self.bottom() - c.y) / 2.0)
    }
}

impl BBox<Xysr> {
    #[inline]
    pub fn xysr(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], Default::default())
    }

    #[inline(always)]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }

    #[inline(always)]
    pub fn cx(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn cy(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn scale(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn aspect_ratio(&self) -> f32 {
        self.0[3]
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Xysr> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        let w = v.0[2] - v.0[0];
        let h = v.0[3] - v.0[1];
        let r = if h != 0.0 { w / h } else { 1.0 };

        Self(
            [
                v.0[0] + w / 2.0,
                v.0[1] + h / 2.0,
                w * h,
                r,
            ],
            Default::default(),
        )
    }
}

impl<'a> From<&'a BBox<Xysr>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Xysr>) -> Self {
        let h = (v.0[2] / v.0[3]).abs().sqrt();
        let w = v.0[3] * h;

        Self(
            [
                v.0[0] - w / 2.0,
                v.0[1] - h / 2.0,
                v.0[0] + w / 2.0,
                v.0[1] + h / 2.0,
            ],
            Default::default(),
        )
    }
}
