use crate::shape::Point;

/// Error bound of the orientation determinant, relative to its permanent.
/// A determinant within the bound could have either sign and is taken as
/// collinear, at any coordinate scale.
const ORIENT_ERR_BOUND: f64 = (3. + 16. * f64::EPSILON / 2.) * f64::EPSILON / 2.;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Clock Wise
    ///
    ///  a     b
    ///             c
    ///
    CW,
    /// Counter Clock Wise
    ///             c
    ///  a     b
    CCW,
    /// Collinear
    ///  a     b    c
    Collinear,
}

impl Orientation {
    pub fn is_cw(&self) -> bool {
        matches!(self, Self::CW)
    }

    pub fn is_ccw(&self) -> bool {
        matches!(self, Self::CCW)
    }

    pub fn is_collinear(&self) -> bool {
        matches!(self, Self::Collinear)
    }
}

/// Orientation of the turn `a -> b -> c`.
pub fn orient_2d(a: Point, b: Point, c: Point) -> Orientation {
    let detleft = (a.x - c.x) * (b.y - c.y);
    let detright = (a.y - c.y) * (b.x - c.x);
    let val = detleft - detright;

    if val.abs() <= ORIENT_ERR_BOUND * (detleft.abs() + detright.abs()) {
        Orientation::Collinear
    } else if val > 0. {
        Orientation::CCW
    } else {
        Orientation::CW
    }
}

/// Whether `p` is left of (or on) the directed line `a -> b`.
pub fn is_left_of(p: Point, a: Point, b: Point) -> bool {
    !orient_2d(a, b, p).is_cw()
}

/// Error bound of the in circle determinant, relative to its permanent.
const IN_CIRCLE_ERR_BOUND: f64 = (10. + 96. * f64::EPSILON / 2.) * f64::EPSILON / 2.;

/// check whether pd is in circle defined by pa, pb, pc
/// requirements: pa is known to be opposite side with pd.
pub fn in_circle(pa: Point, pb: Point, pc: Point, pd: Point) -> bool {
    let adx = pa.x - pd.x;
    let ady = pa.y - pd.y;
    let bdx = pb.x - pd.x;
    let bdy = pb.y - pd.y;

    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;
    let oabd = adxbdy - bdxady;

    if oabd <= 0. {
        return false;
    }

    let cdx = pc.x - pd.x;
    let cdy = pc.y - pd.y;

    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let ocad = cdxady - adxcdy;

    if ocad <= 0. {
        return false;
    }

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * ocad + clift * oabd;

    // within rounding of zero the four points are cocircular, either
    // diagonal is fine and flipping would never settle
    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;

    det > IN_CIRCLE_ERR_BOUND * permanent
}

/// Whether `p` lies strictly inside the circumcircle of the CCW triangle `a, b, c`.
pub fn in_circumcircle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let ax = a.x - p.x;
    let ay = a.y - p.y;
    let bx = b.x - p.x;
    let by = b.y - p.y;
    let cx = c.x - p.x;
    let cy = c.y - p.y;

    let alift = ax * ax + ay * ay;
    let blift = bx * bx + by * by;
    let clift = cx * cx + cy * cy;
    let det =
        alift * (bx * cy - cx * by) - blift * (ax * cy - cx * ay) + clift * (ax * by - bx * ay);

    let permanent = alift * ((bx * cy).abs() + (cx * by).abs())
        + blift * ((ax * cy).abs() + (cx * ay).abs())
        + clift * ((ax * by).abs() + (bx * ay).abs());

    det > IN_CIRCLE_ERR_BOUND * permanent
}

/// Whether `d` falls in the scan area of `a`, i.e. the quad `a, b, d, c` is
/// convex at `b` and `c` and the edge `b-c` can be flipped to `a-d`.
pub fn in_scan_area(a: Point, b: Point, c: Point, d: Point) -> bool {
    orient_2d(a, d, b).is_cw() && orient_2d(a, d, c).is_ccw()
}

/// Intersect the lines `p0 + m0 * v0` and `p1 + m1 * v1`.
///
/// Returns the coefficients `(m0, m1)`, or `None` for parallel lines.
pub fn line_line_intersection(p0: Point, v0: Point, p1: Point, v1: Point) -> Option<(f64, f64)> {
    let det = v0.x * v1.y - v0.y * v1.x;
    if det.abs() <= ORIENT_ERR_BOUND * ((v0.x * v1.y).abs() + (v0.y * v1.x).abs()) {
        return None;
    }

    let m0 = ((p0.y - p1.y) * v1.x - (p0.x - p1.x) * v1.y) / det;
    let m1 = if v1.x.abs() >= v1.y.abs() {
        (p0.x + m0 * v0.x - p1.x) / v1.x
    } else {
        (p0.y + m0 * v0.y - p1.y) / v1.y
    };

    Some((m0, m1))
}

/// The point where the lines `p0 + t * v0` and `p1 + s * v1` cross.
pub fn line_intersection_point(p0: Point, v0: Point, p1: Point, v1: Point) -> Option<Point> {
    let (m0, _) = line_line_intersection(p0, v0, p1, v1)?;
    Some(Point::new(p0.x + m0 * v0.x, p0.y + m0 * v0.y))
}

/// Center of the circle through `a`, `b` and `c`. `None` when they are collinear.
pub fn circumcircle_center(a: Point, b: Point, c: Point) -> Option<Point> {
    let mid_ab = Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5);
    let mid_bc = Point::new((b.x + c.x) * 0.5, (b.y + c.y) * 0.5);

    // perpendicular bisectors
    let v0 = Point::new(-(a.y - b.y), a.x - b.x);
    let v1 = Point::new(-(b.y - c.y), b.x - c.x);

    line_intersection_point(mid_ab, v0, mid_bc, v1)
}

pub fn triangle_centroid(a: Point, b: Point, c: Point) -> Point {
    Point::new((a.x + b.x + c.x) / 3., (a.y + b.y + c.y) / 3.)
}

/// Signed area of a closed polygon, positive for CCW winding.
pub fn signed_area(polygon: &[Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.;
    }

    let mut area = 0.;
    let mut prev = polygon[polygon.len() - 1];
    for p in polygon {
        area += prev.x * p.y - p.x * prev.y;
        prev = *p;
    }

    area * 0.5
}

/// Signed area of triangle `a, b, c`, positive when CCW.
pub fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) * 0.5
}

#[derive(Debug, Clone, Copy)]
pub struct Angle(f64);

impl Angle {
    /// Create angle from three points, is the angle for aob
    pub fn new(o: Point, a: Point, b: Point) -> Self {
        Self(angle(o, a, b))
    }

    /// whether the angle exceeds PI / 2 in either direction
    pub fn exceeds_90_degree(&self) -> bool {
        self.0 > std::f64::consts::FRAC_PI_2 || self.0 < -std::f64::consts::FRAC_PI_2
    }

    /// whether the angle exceeds PI / 2 or is negative
    pub fn exceeds_plus_90_degree_or_is_negative(&self) -> bool {
        self.0 > std::f64::consts::FRAC_PI_2 || self.0 < 0.
    }

    /// whether the angle is negative
    pub fn is_negative(&self) -> bool {
        self.0 < 0.
    }
}

/// Calculate angle for aob in radians
pub fn angle(o: Point, a: Point, b: Point) -> f64 {
    let ox = o.x;
    let oy = o.y;
    let dax = a.x - ox;
    let day = a.y - oy;
    let dbx = b.x - ox;
    let dby = b.y - oy;
    let x = dax * dby - day * dbx;
    let y = dax * dbx + day * dby;
    x.atan2(y)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn test_in_circle() {
        let pa = Point::new(0., 0.);
        let pb = Point::new(2., 0.);
        let pc = Point::new(1., 1.);
        assert!(in_circle(pa, pb, pc, Point::new(1.5, 0.6)));
    }

    #[test]
    fn test_in_circle_cocircular() {
        // an isosceles trapezoid, neither diagonal is illegal
        let a = Point::new(0., 0.);
        let b = Point::new(4., 0.);
        let c = Point::new(-1.2, -1.2);
        let d = Point::new(5.2, -1.2);
        assert!(!in_circle(b, a, d, c));
        assert!(!in_circle(a, c, b, d));
    }

    #[test]
    fn test_in_circumcircle() {
        let a = Point::new(0., 0.);
        let b = Point::new(2., 0.);
        let c = Point::new(0., 2.);
        assert!(in_circumcircle(Point::new(1.9, 1.9), a, b, c));
        assert!(!in_circumcircle(Point::new(2.1, 2.1), a, b, c));
        // on the circle is not inside
        assert!(!in_circumcircle(Point::new(2., 2.), a, b, c));
    }

    #[test]
    fn test_orient_2d() {
        assert_eq!(
            orient_2d(Point::new(0., 0.), Point::new(0., 1.), Point::new(0., 2.)),
            Orientation::Collinear
        );

        assert_eq!(
            orient_2d(Point::new(0., 0.), Point::new(1., 1.), Point::new(2., 2.)),
            Orientation::Collinear
        );

        assert_eq!(
            orient_2d(Point::new(0., 0.), Point::new(1., 1.), Point::new(2., 3.)),
            Orientation::CCW
        );

        assert_eq!(
            orient_2d(Point::new(0., 0.), Point::new(1., 1.), Point::new(2., 1.)),
            Orientation::CW
        );

        assert!(is_left_of(
            Point::new(0., 1.),
            Point::new(0., 0.),
            Point::new(1., 0.)
        ));
    }

    #[test]
    fn test_angle() {
        assert_eq!(
            angle(Point::new(0., 0.), Point::new(1., 0.), Point::new(1., 1.)),
            PI / 4.
        );
        assert!(Angle::new(Point::new(0., 0.), Point::new(1., 0.), Point::new(-1., 0.1))
            .exceeds_90_degree());
    }

    #[test]
    fn test_scan_area() {
        // a above edge b-c with b ccw of a, d below
        let a = Point::new(0., 1.);
        let b = Point::new(-1., 0.);
        let c = Point::new(1., 0.);
        assert!(in_scan_area(a, b, c, Point::new(0., -1.)));
        assert!(!in_scan_area(a, b, c, Point::new(3., -0.1)));
    }

    #[test]
    fn test_circumcircle_center() {
        let center =
            circumcircle_center(Point::new(0., 0.), Point::new(2., 0.), Point::new(0., 2.))
                .unwrap();
        assert!((center.x - 1.).abs() < 1e-9);
        assert!((center.y - 1.).abs() < 1e-9);

        assert!(
            circumcircle_center(Point::new(0., 0.), Point::new(1., 1.), Point::new(2., 2.))
                .is_none()
        );
    }

    #[test]
    fn test_line_line_intersection() {
        let (m0, m1) = line_line_intersection(
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(2., -1.),
            Point::new(0., 1.),
        )
        .unwrap();
        assert!((m0 - 2.).abs() < 1e-12);
        assert!((m1 - 1.).abs() < 1e-12);
        assert!(line_line_intersection(
            Point::new(0., 0.),
            Point::new(1., 1.),
            Point::new(0., 1.),
            Point::new(2., 2.),
        )
        .is_none());
    }

    #[test]
    fn test_signed_area() {
        let square = [
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(1., 1.),
            Point::new(0., 1.),
        ];
        assert_eq!(signed_area(&square), 1.);

        let mut reversed = square;
        reversed.reverse();
        assert_eq!(signed_area(&reversed), -1.);
    }
}
