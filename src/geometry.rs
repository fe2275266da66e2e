use nalgebra as na;
use num_traits::Float;

/// Minimum euclidean distance from a point to a segment.
pub fn segment_distance<F: na::RealField + Float>(
    p: na::Point2<F>,
    a: na::Point2<F>,
    b: na::Point2<F>,
) -> F {
    let d = b - a;
    let len2 = d.norm_squared();

    if len2 <= F::epsilon() {
        return na::distance(&p, &a);
    }

    let t = (p - a).dot(&d) / len2;
    let t = Float::max(F::zero(), Float::min(F::one(), t));

    na::distance(&p, &(a + d * t))
}

/// Minimum euclidean distance from a point to the nearest point on any
/// segment of the polyline.
pub fn polyline_distance<F: na::RealField + Float>(
    p: na::Point2<F>,
    line: &[na::Point2<F>],
) -> F {
    match line {
        [] => Float::infinity(),
        [single] => na::distance(&p, single),
        _ => line
            .windows(2)
            .map(|w| segment_distance(p, w[0], w[1]))
            .fold(Float::infinity(), Float::min),
    }
}

#[inline]
fn orientation<F: na::RealField + Float>(
    a: na::Point2<F>,
    b: na::Point2<F>,
    c: na::Point2<F>,
) -> F {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[inline]
fn within_bounds<F: na::RealField + Float>(
    a: na::Point2<F>,
    b: na::Point2<F>,
    p: na::Point2<F>,
) -> bool {
    p.x >= Float::min(a.x, b.x)
        && p.x <= Float::max(a.x, b.x)
        && p.y >= Float::min(a.y, b.y)
        && p.y <= Float::max(a.y, b.y)
}

/// Segment-segment intersection test, inclusive of touching endpoints and
/// collinear overlap.
pub fn segments_intersect<F: na::RealField + Float>(
    p1: na::Point2<F>,
    p2: na::Point2<F>,
    q1: na::Point2<F>,
    q2: na::Point2<F>,
) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > F::zero() && d2 < F::zero()) || (d1 < F::zero() && d2 > F::zero()))
        && ((d3 > F::zero() && d4 < F::zero()) || (d3 < F::zero() && d4 > F::zero()))
    {
        return true;
    }

    (d1 == F::zero() && within_bounds(q1, q2, p1))
        || (d2 == F::zero() && within_bounds(q1, q2, p2))
        || (d3 == F::zero() && within_bounds(p1, p2, q1))
        || (d4 == F::zero() && within_bounds(p1, p2, q2))
}

/// Ray-casting containment test.
pub fn point_in_polygon<F: na::RealField + Float>(
    p: na::Point2<F>,
    poly: &[na::Point2<F>],
) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut p1 = poly[0];
    let mut xints = F::zero();

    for i in 1..=n {
        let p2 = poly[i % n];

        if p.y > Float::min(p1.y, p2.y)
            && p.y <= Float::max(p1.y, p2.y)
            && p.x <= Float::max(p1.x, p2.x)
        {
            if Float::abs(p1.y - p2.y) > F::epsilon() {
                xints = (p.y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y) + p1.x;
            }

            if Float::abs(p1.x - p2.x) < F::epsilon() || p.x <= xints {
                inside = !inside;
            }
        }

        p1 = p2;
    }

    inside
}

/// True if any segment of the polyline crosses the polygon boundary, or the
/// polygon contains a polyline vertex.
pub fn polyline_intersects_polygon<F: na::RealField + Float>(
    line: &[na::Point2<F>],
    poly: &[na::Point2<F>],
) -> bool {
    let n = poly.len();
    if line.is_empty() || n < 3 {
        return false;
    }

    for w in line.windows(2) {
        for i in 0..n {
            if segments_intersect(w[0], w[1], poly[i], poly[(i + 1) % n]) {
                return true;
            }
        }
    }

    line.iter().any(|v| point_in_polygon(*v, poly))
}

/// Vertex mean; coincides with the geometric centroid for the axis-aligned
/// boxes this crate feeds it.
pub fn centroid<F: na::RealField + Float>(poly: &[na::Point2<F>]) -> na::Point2<F> {
    let mut acc = na::Vector2::new(F::zero(), F::zero());

    for p in poly {
        acc += p.coords;
    }

    let n = F::from(poly.len().max(1)).unwrap();

    na::Point2::from(acc / n)
}
