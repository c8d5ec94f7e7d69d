//! Input checks run before the sweep. The sweep assumes simple,
//! non-intersecting rings and misbehaves in hard to explain ways otherwise.

use crate::{errors::InputError, shape::ring_contains, utils::orient_2d, Point};

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: Point,
    b: Point,
    min_x: f64,
    max_x: f64,
}

impl Segment {
    fn new(a: Point, b: Point) -> Self {
        Self {
            a,
            b,
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
        }
    }

    fn y_overlaps(&self, other: &Segment) -> bool {
        self.a.y.min(self.b.y) <= other.a.y.max(other.b.y)
            && other.a.y.min(other.b.y) <= self.a.y.max(self.b.y)
    }
}

/// Check the rings and steiner points of one shape.
///
/// * no two edges intersect, except adjacent edges meeting at their shared
///   vertex
/// * every hole lies inside the outline and outside every other hole
/// * every steiner point lies inside the shape, or on one of its rings
pub(crate) fn validate(
    outline: &[Point],
    holes: &[Vec<Point>],
    steiner_points: &[Point],
) -> Result<(), InputError> {
    check_intersections(std::iter::once(outline).chain(holes.iter().map(Vec::as_slice)))?;

    for (idx, hole) in holes.iter().enumerate() {
        if !hole.iter().all(|p| ring_contains(outline, *p)) {
            return Err(InputError::HoleNotContained(idx));
        }
    }
    // rings don't cross, so one vertex tells whether a hole is inside another
    for (idx, hole) in holes.iter().enumerate() {
        for (other_idx, other) in holes.iter().enumerate() {
            if idx != other_idx && ring_contains(other, hole[0]) {
                return Err(InputError::HoleNotContained(idx));
            }
        }
    }

    for p in steiner_points {
        // a point on a ring edge splits that edge
        let mut rings = std::iter::once(outline).chain(holes.iter().map(Vec::as_slice));
        if rings.any(|ring| on_ring(ring, *p)) {
            continue;
        }
        let inside = ring_contains(outline, *p) && !holes.iter().any(|h| ring_contains(h, *p));
        if !inside {
            return Err(InputError::SteinerOutside { x: p.x, y: p.y });
        }
    }

    Ok(())
}

/// Sweep and prune over the x extents of all ring edges.
fn check_intersections<'a>(rings: impl Iterator<Item = &'a [Point]>) -> Result<(), InputError> {
    let mut segments = Vec::new();
    for ring in rings {
        for (i, a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            if *a != b {
                segments.push(Segment::new(*a, b));
            }
        }
    }
    segments.sort_by(|l, r| l.min_x.total_cmp(&r.min_x));

    for (i, segment) in segments.iter().enumerate() {
        for other in segments[i + 1..].iter() {
            if other.min_x > segment.max_x {
                break;
            }
            if segment.y_overlaps(other) && segments_conflict(segment, other) {
                return Err(InputError::SelfIntersecting {
                    a_x: segment.a.x,
                    a_y: segment.a.y,
                    b_x: segment.b.x,
                    b_y: segment.b.y,
                });
            }
        }
    }

    Ok(())
}

/// Whether `p`, known to be collinear with `a-b`, lies within its extent
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Whether `p` lies on a vertex or edge of `ring`
fn on_ring(ring: &[Point], p: Point) -> bool {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .any(|(a, b)| orient_2d(*a, *b, p).is_collinear() && on_segment(*a, *b, p))
}

fn segments_conflict(s: &Segment, t: &Segment) -> bool {
    let (a, b, c, d) = (s.a, s.b, t.a, t.b);

    // the same edge twice, in either direction
    if (a == c && b == d) || (a == d && b == c) {
        return true;
    }

    let shared = if a == c || a == d {
        Some((a, b, if a == c { d } else { c }))
    } else if b == c || b == d {
        Some((b, a, if b == c { d } else { c }))
    } else {
        None
    };

    if let Some((shared, u, v)) = shared {
        // edges meeting at a vertex only conflict when they fold onto
        // each other
        if !orient_2d(shared, u, v).is_collinear() {
            return false;
        }
        let dot = (u.x - shared.x) * (v.x - shared.x) + (u.y - shared.y) * (v.y - shared.y);
        return dot > 0.;
    }

    let o1 = orient_2d(a, b, c);
    let o2 = orient_2d(a, b, d);
    let o3 = orient_2d(c, d, a);
    let o4 = orient_2d(c, d, b);

    if o1 != o2
        && o3 != o4
        && !o1.is_collinear()
        && !o2.is_collinear()
        && !o3.is_collinear()
        && !o4.is_collinear()
    {
        return true;
    }

    (o1.is_collinear() && on_segment(a, b, c))
        || (o2.is_collinear() && on_segment(a, b, d))
        || (o3.is_collinear() && on_segment(c, d, a))
        || (o4.is_collinear() && on_segment(c, d, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[[f64; 2]]) -> Vec<Point> {
        coords.iter().map(|c| Point::from(*c)).collect()
    }

    fn square() -> Vec<Point> {
        ring(&[[0., 0.], [4., 0.], [4., 4.], [0., 4.]])
    }

    #[test]
    fn test_valid() {
        let hole = ring(&[[1., 1.], [1., 3.], [3., 3.], [3., 1.]]);
        assert_eq!(
            validate(&square(), &[hole], &[Point::new(0.5, 0.5), Point::new(4., 4.)]),
            Ok(())
        );
    }

    #[test]
    fn test_self_intersecting() {
        let bowtie = ring(&[[0., 0.], [2., 2.], [2., 0.], [0., 2.]]);
        assert!(matches!(
            validate(&bowtie, &[], &[]),
            Err(InputError::SelfIntersecting { .. })
        ));

        // a vertex touching another edge
        let touching = ring(&[[0., 0.], [4., 0.], [4., 4.], [2., 0.], [0., 4.]]);
        assert!(matches!(
            validate(&touching, &[], &[]),
            Err(InputError::SelfIntersecting { .. })
        ));

        // a hole crossing the outline
        let hole = ring(&[[3., 1.], [3., 3.], [5., 3.], [5., 1.]]);
        assert!(matches!(
            validate(&square(), &[hole], &[]),
            Err(InputError::SelfIntersecting { .. })
        ));
    }

    #[test]
    fn test_spike_folding_back() {
        let spike = ring(&[[0., 0.], [4., 0.], [4., 4.], [2., 4.], [2., 2.], [2., 4.], [0., 4.]]);
        assert!(matches!(
            validate(&spike, &[], &[]),
            Err(InputError::SelfIntersecting { .. })
        ));
    }

    #[test]
    fn test_hole_outside() {
        let hole = ring(&[[5., 5.], [5., 6.], [6., 6.], [6., 5.]]);
        assert_eq!(
            validate(&square(), &[hole], &[]),
            Err(InputError::HoleNotContained(0))
        );

        let hole = ring(&[[1., 1.], [1., 3.], [3., 3.], [3., 1.]]);
        let inner = ring(&[[1.5, 1.5], [1.5, 2.5], [2.5, 2.5], [2.5, 1.5]]);
        assert_eq!(
            validate(&square(), &[hole, inner], &[]),
            Err(InputError::HoleNotContained(1))
        );
    }

    #[test]
    fn test_steiner_outside() {
        assert_eq!(
            validate(&square(), &[], &[Point::new(5., 1.)]),
            Err(InputError::SteinerOutside { x: 5., y: 1. })
        );

        let hole = ring(&[[1., 1.], [1., 3.], [3., 3.], [3., 1.]]);
        assert_eq!(
            validate(&square(), &[hole], &[Point::new(2., 2.)]),
            Err(InputError::SteinerOutside { x: 2., y: 2. })
        );

        // beyond the end of an edge, on its line
        assert_eq!(
            validate(&square(), &[], &[Point::new(6., 0.)]),
            Err(InputError::SteinerOutside { x: 6., y: 0. })
        );
    }

    #[test]
    fn test_steiner_on_edges() {
        let triangle = ring(&[[0., 0.], [10., 0.], [0., 10.]]);
        let on_edges = [
            Point::new(5., 5.),
            Point::new(2.5, 7.5),
            Point::new(4., 0.),
            Point::new(0., 3.),
        ];
        assert_eq!(validate(&triangle, &[], &on_edges), Ok(()));

        let hole = ring(&[[1., 1.], [1., 3.], [3., 3.], [3., 1.]]);
        let on_hole = [Point::new(2., 1.), Point::new(3., 2.), Point::new(1., 1.)];
        assert_eq!(validate(&square(), &[hole], &on_hole), Ok(()));
    }
}
