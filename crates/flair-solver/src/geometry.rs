//! Line intersections, axis intercepts and the feasibility predicate.
//!
//! Every routine treats a constraint's boundary `a·x1 + b·x2 = c` as a line;
//! the operator only matters to `is_feasible`.

use crate::problem::{Constraint, DET_EPSILON, Point};
use crate::region::BoundingBox;

/// Intersection of the boundary lines of `r1` and `r2` (Cramer's rule).
///
/// Returns `None` when the lines are parallel or coincident, including a
/// constraint intersected with itself.
pub fn intersect(r1: &Constraint, r2: &Constraint) -> Option<Point> {
    let det = r1.a * r2.b - r2.a * r1.b;
    if det.abs() < DET_EPSILON {
        return None;
    }
    let x1 = (r1.c * r2.b - r2.c * r1.b) / det;
    let x2 = (r1.a * r2.c - r2.a * r1.c) / det;
    Some(Point::new(x1, x2))
}

/// Points where the boundary of `r` crosses the coordinate axes.
///
/// A vertical line (`b = 0`) yields its x1 intercept and the point at
/// `bounds.max_y` above it; a horizontal line (`a = 0`) yields its x2
/// intercept and the point at `bounds.max_x` beside it.
pub fn axis_intercepts(r: &Constraint, bounds: &BoundingBox) -> Vec<Point> {
    let mut points = Vec::with_capacity(2);
    if r.b == 0.0 {
        let x1 = r.c / r.a;
        points.push(Point::new(x1, 0.0));
        points.push(Point::new(x1, bounds.max_y));
    } else if r.a == 0.0 {
        let x2 = r.c / r.b;
        points.push(Point::new(0.0, x2));
        points.push(Point::new(bounds.max_x, x2));
    } else {
        points.push(Point::new(0.0, r.c / r.b));
        points.push(Point::new(r.c / r.a, 0.0));
    }
    points
}

/// A point is feasible when it satisfies every constraint within `EPSILON`.
pub fn is_feasible(p: Point, constraints: &[Constraint]) -> bool {
    constraints.iter().all(|r| r.is_satisfied_by(p))
}

/// The part of the boundary line of `r` inside `bounds`, as its two endpoints
/// ordered by x1 then x2. `None` when the line misses the box or only grazes a corner.
pub fn clip_to_bounds(r: &Constraint, bounds: &BoundingBox) -> Option<(Point, Point)> {
    let mut hits: Vec<Point> = Vec::with_capacity(4);
    if r.b != 0.0 {
        for x1 in [0.0, bounds.max_x] {
            hits.push(Point::new(x1, (r.c - r.a * x1) / r.b));
        }
    }
    if r.a != 0.0 {
        for x2 in [0.0, bounds.max_y] {
            hits.push(Point::new((r.c - r.b * x2) / r.a, x2));
        }
    }
    hits.retain(|p| bounds.contains(*p));
    hits.sort_by(|p, q| p.x1.total_cmp(&q.x1).then(p.x2.total_cmp(&q.x2)));
    hits.dedup_by(|p, q| p.approx_eq(q));

    let first = *hits.first()?;
    let last = *hits.last()?;
    if first.approx_eq(&last) {
        return None;
    }
    Some((first, last))
}

/// Whether `(d1, d2)` is a direction along which every constraint stays satisfied forever.
///
/// The rate of change along `d` is judged relative to each row's coefficient
/// norm, so a row such as `1e-7·x1 + x2 <= 5` still closes off the x1 axis.
pub(crate) fn is_recession_direction(d: Point, constraints: &[Constraint]) -> bool {
    use crate::problem::ConstraintOp;

    if d.x1 < 0.0 || d.x2 < 0.0 {
        return false;
    }
    constraints.iter().all(|r| {
        let rate = r.a * d.x1 + r.b * d.x2;
        let tol = DET_EPSILON * r.a.hypot(r.b);
        match r.op {
            ConstraintOp::Le => rate <= tol,
            ConstraintOp::Ge => rate >= -tol,
            ConstraintOp::Eq => rate.abs() <= tol,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::flair_furniture_constraints;

    fn bounds() -> BoundingBox {
        BoundingBox::new(60.0, 100.0)
    }

    #[test]
    fn test_intersect_flair_lines() {
        let carpentry = Constraint::le(4.0, 3.0, 240.0).unwrap();
        let painting = Constraint::le(2.0, 1.0, 100.0).unwrap();
        let p = intersect(&carpentry, &painting).unwrap();
        assert!((p.x1 - 30.0).abs() < 1e-9, "x1 = {} (expected 30)", p.x1);
        assert!((p.x2 - 40.0).abs() < 1e-9, "x2 = {} (expected 40)", p.x2);
    }

    #[test]
    fn test_intersect_ignores_operator() {
        let le = Constraint::le(1.0, 1.0, 10.0).unwrap();
        let ge = Constraint::ge(1.0, -1.0, 2.0).unwrap();
        let p = intersect(&le, &ge).unwrap();
        assert!(p.approx_eq(&Point::new(6.0, 4.0)));
    }

    #[test]
    fn test_intersect_parallel_is_none() {
        let r = Constraint::le(1.0, 1.0, 10.0).unwrap();
        assert_eq!(intersect(&r, &r), None);

        let shifted = Constraint::ge(2.0, 2.0, 4.0).unwrap();
        assert_eq!(intersect(&r, &shifted), None);
    }

    #[test]
    fn test_axis_intercepts_general_line() {
        let r = Constraint::le(4.0, 3.0, 240.0).unwrap();
        let pts = axis_intercepts(&r, &bounds());
        assert_eq!(pts, vec![Point::new(0.0, 80.0), Point::new(60.0, 0.0)]);
    }

    #[test]
    fn test_axis_intercepts_axis_parallel_lines() {
        let horizontal = Constraint::le(0.0, 1.0, 60.0).unwrap();
        assert_eq!(
            axis_intercepts(&horizontal, &bounds()),
            vec![Point::new(0.0, 60.0), Point::new(60.0, 60.0)]
        );

        let vertical = Constraint::le(2.0, 0.0, 50.0).unwrap();
        assert_eq!(
            axis_intercepts(&vertical, &bounds()),
            vec![Point::new(25.0, 0.0), Point::new(25.0, 100.0)]
        );
    }

    #[test]
    fn test_is_feasible() {
        let constraints = flair_furniture_constraints();
        assert!(is_feasible(Point::new(30.0, 40.0), &constraints));
        assert!(is_feasible(Point::ORIGIN, &constraints));
        assert!(!is_feasible(Point::new(20.0, 60.0), &constraints));
        assert!(!is_feasible(Point::new(-1.0, 0.0), &constraints));
    }

    #[test]
    fn test_is_feasible_order_independent() {
        let mut constraints = flair_furniture_constraints();
        let p = Point::new(15.0, 60.0);
        let forward = is_feasible(p, &constraints);
        constraints.reverse();
        assert_eq!(forward, is_feasible(p, &constraints));
    }

    #[test]
    fn test_clip_to_bounds() {
        let r = Constraint::le(2.0, 1.0, 100.0).unwrap();
        let (p, q) = clip_to_bounds(&r, &bounds()).unwrap();
        assert!(p.approx_eq(&Point::new(0.0, 100.0)));
        assert!(q.approx_eq(&Point::new(50.0, 0.0)));

        let outside = Constraint::le(1.0, 1.0, 500.0).unwrap();
        assert_eq!(clip_to_bounds(&outside, &bounds()), None);
    }

    #[test]
    fn test_recession_direction() {
        let quadrant = [
            Constraint::ge(1.0, 0.0, 0.0).unwrap(),
            Constraint::ge(0.0, 1.0, 0.0).unwrap(),
        ];
        assert!(is_recession_direction(Point::new(1.0, 0.0), &quadrant));
        assert!(!is_recession_direction(
            Point::new(1.0, 0.0),
            &flair_furniture_constraints()
        ));

        // Heading even slightly below the x1 axis leaves the quadrant.
        assert!(!is_recession_direction(Point::new(1.0, -1e-9), &quadrant));
    }
}
