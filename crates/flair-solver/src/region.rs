//! Feasible-region extraction: candidate vertices, the drawing box and the
//! boundary polygon.

use std::cmp::Ordering;

use crate::geometry::{axis_intercepts, intersect, is_feasible, is_recession_direction};
use crate::problem::{Constraint, ConstraintOp, EPSILON, Point, Prices};

/// Margin applied to the optimum when sizing the drawing box
pub const MARGIN: f64 = 1.2;

/// Smallest extent of the drawing box along either axis
pub const MIN_EXTENT: f64 = 10.0;

/// Axis-aligned box `[0, max_x] × [0, max_y]`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(max_x: f64, max_y: f64) -> Self {
        Self { max_x, max_y }
    }

    /// Size the box from the positive axis intercepts of every constraint and,
    /// when given, the optimum scaled by `MARGIN`. Each extent is at least
    /// `MIN_EXTENT` and rounded up to the next multiple of ten.
    ///
    /// `-x1 - x2 >= -20` bounds the region as tightly as `x1 + x2 <= 20`, so
    /// the operator and coefficient signs are not consulted.
    pub fn derive(constraints: &[Constraint], optimum: Option<Point>) -> Self {
        let mut max_x: f64 = 0.0;
        let mut max_y: f64 = 0.0;

        for r in constraints {
            if r.a != 0.0 && r.c / r.a > 0.0 {
                max_x = max_x.max(r.c / r.a);
            }
            if r.b != 0.0 && r.c / r.b > 0.0 {
                max_y = max_y.max(r.c / r.b);
            }
        }

        if let Some(p) = optimum {
            max_x = max_x.max(p.x1 * MARGIN);
            max_y = max_y.max(p.x2 * MARGIN);
        }

        let round_up = |v: f64| (v.max(MIN_EXTENT) / 10.0).ceil() * 10.0;
        Self {
            max_x: round_up(max_x),
            max_y: round_up(max_y),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x1 >= -EPSILON
            && p.x2 >= -EPSILON
            && p.x1 <= self.max_x + EPSILON
            && p.x2 <= self.max_y + EPSILON
    }
}

/// Boundary lines of the non-negative quadrant, `x1 = 0` and `x2 = 0`
const AXES: [Constraint; 2] = [
    Constraint {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        op: ConstraintOp::Ge,
    },
    Constraint {
        a: 0.0,
        b: 1.0,
        c: 0.0,
        op: ConstraintOp::Ge,
    },
];

fn cmp_points(p: &Point, q: &Point) -> Ordering {
    p.x1.total_cmp(&q.x1).then(p.x2.total_cmp(&q.x2))
}

/// Feasible candidate vertices, sorted by `(x1, x2)` with near-duplicates removed.
///
/// Candidates are the origin, the axis intercepts of every constraint that lie
/// inside `bounds`, and the intersection of every pair of constraint boundaries
/// regardless of operator. The quadrant is always enforced, so every boundary
/// is also intersected with both axes whether or not `x1 >= 0` and `x2 >= 0`
/// were given; `bounds` only limits the extended points of axis-parallel lines.
/// Anything outside the non-negative quadrant or violating a constraint is
/// dropped.
pub fn candidate_vertices(constraints: &[Constraint], bounds: &BoundingBox) -> Vec<Point> {
    let mut candidates = vec![Point::ORIGIN];

    for r in constraints {
        candidates.extend(
            axis_intercepts(r, bounds)
                .into_iter()
                .filter(|p| bounds.contains(*p)),
        );
    }

    for (i, r1) in constraints.iter().enumerate() {
        for r2 in constraints[i + 1..].iter().chain(&AXES) {
            if let Some(p) = intersect(r1, r2) {
                candidates.push(p);
            }
        }
    }

    let mut vertices: Vec<Point> = candidates
        .into_iter()
        .map(Point::clamp_noise)
        .filter(|p| p.is_finite() && p.is_non_negative() && is_feasible(*p, constraints))
        .collect();

    vertices.sort_by(cmp_points);
    dedup_points(&mut vertices);
    vertices
}

/// Drop points within `EPSILON` of an already kept point. Expects sorted input;
/// the full scan guards against near-equal points separated by a third one.
fn dedup_points(points: &mut Vec<Point>) {
    let mut kept: Vec<Point> = Vec::with_capacity(points.len());
    for p in points.drain(..) {
        if !kept.iter().any(|q| q.approx_eq(&p)) {
            kept.push(p);
        }
    }
    *points = kept;
}

/// Counter-clockwise convex hull of `vertices` (Andrew's monotone chain),
/// starting from the lowest `(x1, x2)` point. Collinear points are dropped.
pub fn ordered_boundary(vertices: &[Point]) -> Vec<Point> {
    let mut pts = vertices.to_vec();
    pts.sort_by(cmp_points);
    dedup_points(&mut pts);
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
    for p in &pts {
        while let [.., o, a] = lower[..] {
            if cross(o, a, *p) > 0.0 {
                break;
            }
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while let [.., o, a] = upper[..] {
            if cross(o, a, *p) > 0.0 {
                break;
            }
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[inline]
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x1 - o.x1) * (b.x2 - o.x2) - (a.x2 - o.x2) * (b.x1 - o.x1)
}

/// Whether the objective can grow without limit over the feasible region.
///
/// The region lives in the non-negative quadrant, so its recession cone is
/// pointed and its extreme rays run along an axis or a constraint boundary.
/// With strictly positive prices any non-zero recession direction improves
/// the objective.
pub fn is_unbounded(constraints: &[Constraint], prices: &Prices) -> bool {
    let mut directions = vec![Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
    for r in constraints {
        let norm = r.a.hypot(r.b);
        let along = Point::new(r.b / norm, -r.a / norm);
        directions.push(along);
        directions.push(Point::new(-along.x1, -along.x2));
    }

    directions
        .into_iter()
        .filter(|d| prices.objective(*d) > EPSILON)
        .any(|d| is_recession_direction(d, constraints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::flair_furniture_constraints;

    #[test]
    fn test_derive_bounds_flair() {
        let bounds = BoundingBox::derive(&flair_furniture_constraints(), None);
        assert_eq!(bounds, BoundingBox::new(60.0, 100.0));

        let with_optimum =
            BoundingBox::derive(&flair_furniture_constraints(), Some(Point::new(30.0, 40.0)));
        assert_eq!(with_optimum, BoundingBox::new(60.0, 100.0));
    }

    #[test]
    fn test_derive_bounds_floor_and_rounding() {
        let tiny = [Constraint::le(1.0, 1.0, 3.0).unwrap()];
        assert_eq!(BoundingBox::derive(&tiny, None), BoundingBox::new(10.0, 10.0));

        let odd = [Constraint::le(1.0, 2.0, 41.0).unwrap()];
        assert_eq!(BoundingBox::derive(&odd, None), BoundingBox::new(50.0, 30.0));

        let optimum = Some(Point::new(45.0, 5.0));
        assert_eq!(BoundingBox::derive(&tiny, optimum), BoundingBox::new(60.0, 10.0));
    }

    #[test]
    fn test_derive_bounds_reads_ge_rows() {
        let ge_form = [Constraint::ge(-1.0, -1.0, -20.0).unwrap()];
        assert_eq!(BoundingBox::derive(&ge_form, None), BoundingBox::new(20.0, 20.0));

        // Lower bounds still widen the box to keep their lines on the chart.
        let lower = [Constraint::ge(0.0, 1.0, 35.0).unwrap()];
        assert_eq!(BoundingBox::derive(&lower, None), BoundingBox::new(10.0, 40.0));
    }

    #[test]
    fn test_vertices_on_axes_without_quadrant_rows() {
        // x1 + x2 <= 20 written as a >= row, with no x1 >= 0 or x2 >= 0.
        let constraints = [Constraint::ge(-1.0, -1.0, -20.0).unwrap()];
        let tiny_box = BoundingBox::new(10.0, 10.0);
        let vertices = candidate_vertices(&constraints, &tiny_box);
        assert_eq!(
            vertices,
            vec![Point::new(0.0, 0.0), Point::new(0.0, 20.0), Point::new(20.0, 0.0)]
        );
    }

    #[test]
    fn test_candidate_vertices_flair() {
        let constraints = flair_furniture_constraints();
        let bounds = BoundingBox::derive(&constraints, None);
        let vertices = candidate_vertices(&constraints, &bounds);

        let expected = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 60.0),
            Point::new(15.0, 60.0),
            Point::new(30.0, 40.0),
            Point::new(50.0, 0.0),
        ];
        assert_eq!(vertices.len(), expected.len(), "vertices = {:?}", vertices);
        for (got, want) in vertices.iter().zip(expected.iter()) {
            assert!(got.approx_eq(want), "got {} expected {}", got, want);
        }
    }

    #[test]
    fn test_candidate_vertices_no_duplicates() {
        let constraints = [
            Constraint::le(1.0, 1.0, 10.0).unwrap(),
            Constraint::le(1.0, 1.0, 10.0).unwrap(),
            Constraint::le(1.0, 0.0, 10.0).unwrap(),
            Constraint::ge(1.0, 0.0, 0.0).unwrap(),
            Constraint::ge(0.0, 1.0, 0.0).unwrap(),
        ];
        let bounds = BoundingBox::derive(&constraints, None);
        let vertices = candidate_vertices(&constraints, &bounds);
        for (i, p) in vertices.iter().enumerate() {
            for q in &vertices[i + 1..] {
                assert!(!p.approx_eq(q), "{} and {} are duplicates", p, q);
            }
        }
        assert_eq!(vertices.len(), 3);
    }

    #[test]
    fn test_ge_pairs_are_intersected() {
        // Lower bounds x1 >= 2 and x2 >= 3 meet at a genuine vertex (2, 3).
        let constraints = [
            Constraint::ge(1.0, 0.0, 2.0).unwrap(),
            Constraint::ge(0.0, 1.0, 3.0).unwrap(),
            Constraint::le(1.0, 1.0, 10.0).unwrap(),
        ];
        let bounds = BoundingBox::derive(&constraints, None);
        let vertices = candidate_vertices(&constraints, &bounds);
        assert!(vertices.iter().any(|p| p.approx_eq(&Point::new(2.0, 3.0))));
        assert!(!vertices.iter().any(|p| p.approx_eq(&Point::ORIGIN)));
    }

    #[test]
    fn test_ordered_boundary_is_ccw_hull() {
        let vertices = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 60.0),
            Point::new(15.0, 60.0),
            Point::new(30.0, 40.0),
            Point::new(50.0, 0.0),
        ];
        let hull = ordered_boundary(&vertices);
        assert_eq!(
            hull,
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(30.0, 40.0),
                Point::new(15.0, 60.0),
                Point::new(0.0, 60.0),
            ]
        );

        let mut area = 0.0;
        for k in 0..hull.len() {
            let p = hull[k];
            let q = hull[(k + 1) % hull.len()];
            area += p.x1 * q.x2 - q.x1 * p.x2;
        }
        assert!(area > 0.0, "boundary must wind counter-clockwise");
    }

    #[test]
    fn test_ordered_boundary_drops_interior_and_collinear() {
        let vertices = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(4.0, 4.0),
        ];
        let hull = ordered_boundary(&vertices);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point::new(5.0, 0.0)));
        assert!(!hull.contains(&Point::new(4.0, 4.0)));
    }

    #[test]
    fn test_is_unbounded() {
        let prices = Prices::new(1.0, 1.0).unwrap();
        let quadrant = [
            Constraint::ge(1.0, 0.0, 0.0).unwrap(),
            Constraint::ge(0.0, 1.0, 0.0).unwrap(),
        ];
        assert!(is_unbounded(&quadrant, &prices));
        assert!(!is_unbounded(&flair_furniture_constraints(), &prices));

        // A strip that is open upwards along x2.
        let strip = [Constraint::le(1.0, 0.0, 5.0).unwrap()];
        assert!(is_unbounded(&strip, &prices));

        // Open along the diagonal ray x1 = x2.
        let wedge = [
            Constraint::le(1.0, -1.0, 0.0).unwrap(),
            Constraint::ge(1.0, -1.0, 0.0).unwrap(),
        ];
        assert!(is_unbounded(&wedge, &prices));
    }

    #[test]
    fn test_small_coefficient_still_bounds() {
        let prices = Prices::new(1.0, 1.0).unwrap();
        // x1 <= 5e7 along the x2 = 0 edge
        let shallow = [Constraint::le(1e-7, 1.0, 5.0).unwrap()];
        assert!(!is_unbounded(&shallow, &prices));

        let flat = [Constraint::le(0.0, 1.0, 5.0).unwrap()];
        assert!(is_unbounded(&flat, &prices));
    }
}
