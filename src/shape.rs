use crate::{
    utils::{orient_2d, signed_area},
    Config, PointId, SweeperBuilder, Triangulation,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Default for Point {
    fn default() -> Self {
        Self { x: 0., y: 0. }
    }
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Hash key for value identity, `-0.0` and `0.0` map to the same key.
    pub(crate) fn key(&self) -> (u64, u64) {
        ((self.x + 0.).to_bits(), (self.y + 0.).to_bits())
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

/// A constrained edge. Undirected, but stored with `p` before `q` in sweep order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// p is the lower end
    pub p: PointId,
    /// q is the higher end
    pub q: PointId,
}

impl Edge {
    /// Create an edge from two points, ordering the endpoints by y then x.
    /// Returns `None` for a zero length edge.
    pub fn new((p1_id, p1): (PointId, &Point), (p2_id, p2): (PointId, &Point)) -> Option<Self> {
        let (p, q) = if p1.y > p2.y || (p1.y == p2.y && p1.x > p2.x) {
            (p2_id, p1_id)
        } else if p1.y == p2.y && p1.x == p2.x {
            return None;
        } else {
            (p1_id, p2_id)
        };

        Some(Self { p, q })
    }
}

/// Axis aligned bounding rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// inclusive containment
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// A polygon outline with optional holes and interior steiner points.
///
/// The outline needs at least 3 distinct points. Holes must lie fully inside
/// the outline and must not touch the outline or each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub points: Vec<Point>,
    /// subtraction shapes, only their outline is used. Nested holes and
    /// steiner points of a hole are ignored.
    pub holes: Vec<Shape>,
    /// extra points inside the shape to densify the mesh
    pub steiner_points: Vec<Point>,
}

impl Shape {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            holes: vec![],
            steiner_points: vec![],
        }
    }

    pub fn from_coords(coords: &[[f64; 2]]) -> Self {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    /// Create a shape from points, each scaled by `scale` then moved by `offset`
    pub fn with_transform(points: &[Point], offset: Point, scale: f64) -> Self {
        Self::new(
            points
                .iter()
                .map(|p| Point::new(p.x * scale + offset.x, p.y * scale + offset.y))
                .collect(),
        )
    }

    pub fn add_hole(&mut self, hole: Shape) -> &mut Self {
        self.holes.push(hole);
        self
    }

    pub fn add_steiner_point(&mut self, point: Point) -> &mut Self {
        self.steiner_points.push(point);
        self
    }

    pub fn add_steiner_points(&mut self, points: impl IntoIterator<Item = Point>) -> &mut Self {
        self.steiner_points.extend(points);
        self
    }

    /// Bounds of the outline. `None` for an empty shape.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let mut rect = Rect {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };

        for p in &self.points[1..] {
            rect.min_x = rect.min_x.min(p.x);
            rect.min_y = rect.min_y.min(p.y);
            rect.max_x = rect.max_x.max(p.x);
            rect.max_y = rect.max_y.max(p.y);
        }

        Some(rect)
    }

    /// Signed area of the outline, positive for CCW.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// Area covered by the shape, the outline minus its holes.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
            - self
                .holes
                .iter()
                .map(|h| h.signed_area().abs())
                .sum::<f64>()
    }

    /// Whether `point` is inside the outline and outside every hole.
    pub fn contains(&self, point: Point) -> bool {
        if self.holes.iter().any(|h| h.outline_contains(point)) {
            return false;
        }

        self.outline_contains(point)
    }

    /// Whether every outline point of `shape` is contained in this one.
    pub fn contains_shape(&self, shape: &Shape) -> bool {
        shape.points.iter().all(|p| self.contains(*p))
    }

    /// crossing number test against the outline only
    pub(crate) fn outline_contains(&self, point: Point) -> bool {
        ring_contains(&self.points, point)
    }

    pub fn scale(&mut self, scale: f64) {
        self.scale_xy(scale, scale);
    }

    pub fn scale_xy(&mut self, sx: f64, sy: f64) {
        self.transform(|p| Point::new(p.x * sx, p.y * sy));
    }

    pub fn offset(&mut self, offset: Point) {
        self.transform(|p| Point::new(p.x + offset.x, p.y + offset.y));
    }

    /// scale first, then offset
    pub fn scale_and_offset(&mut self, offset: Point, scale: f64) {
        self.transform(|p| Point::new(p.x * scale + offset.x, p.y * scale + offset.y));
    }

    fn transform(&mut self, f: impl Fn(Point) -> Point + Copy) {
        for p in self.points.iter_mut().chain(self.steiner_points.iter_mut()) {
            *p = f(*p);
        }
        for hole in &mut self.holes {
            hole.transform(f);
        }
    }

    /// Triangulate with the default [`Config`].
    pub fn triangulate(&self) -> Result<Triangulation, crate::Error> {
        self.triangulate_with(Config::default())
    }

    /// Triangulate the shape. The shape itself is left untouched.
    pub fn triangulate_with(&self, config: Config) -> Result<Triangulation, crate::Error> {
        let outline = normalize_ring(&self.points, true)?;

        let mut builder = SweeperBuilder::new(outline).config(config);
        for hole in &self.holes {
            builder = builder.add_hole(normalize_ring(&hole.points, false)?);
        }
        builder = builder.add_steiner_points(self.steiner_points.iter().copied());

        builder.build()?.triangulate()
    }
}

/// crossing number test
pub(crate) fn ring_contains(ring: &[Point], point: Point) -> bool {
    let Some(last) = ring.last() else {
        return false;
    };

    let mut inside = false;
    let mut start = *last;
    for end in ring {
        if (end.y > point.y) != (start.y > point.y)
            && (point.x - end.x) < (point.y - end.y) * (start.x - end.x) / (start.y - end.y)
        {
            inside = !inside;
        }
        start = *end;
    }

    inside
}

/// Prepare a ring for the sweep: drop repeated points, collapse exactly
/// collinear vertices into their edge and orient it CCW (or CW for holes).
pub(crate) fn normalize_ring(ring: &[Point], ccw: bool) -> Result<Vec<Point>, crate::InputError> {
    if let Some(p) = ring.iter().find(|p| !p.is_finite()) {
        return Err(crate::InputError::NonFinite { x: p.x, y: p.y });
    }

    // one pass with a stack: a vertex collinear with the one below it and
    // the incoming point is popped, then the seam is closed the same way
    let mut points: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring {
        if points.last() == Some(p) {
            continue;
        }
        while let [.., a, b] = points[..] {
            if !orient_2d(a, b, *p).is_collinear() {
                break;
            }
            points.pop();
        }
        if points.last() != Some(p) {
            points.push(*p);
        }
    }

    let mut start = 0;
    while points.len() - start >= 3 {
        let n = points.len();
        if orient_2d(points[n - 2], points[n - 1], points[start]).is_collinear() {
            points.pop();
        } else if orient_2d(points[n - 1], points[start], points[start + 1]).is_collinear() {
            start += 1;
        } else {
            break;
        }
    }
    points.drain(..start);

    if points.len() < 3 {
        return Err(crate::InputError::TooFewPoints(points.len()));
    }

    let area = signed_area(&points);
    if (area > 0.) != ccw {
        points.reverse();
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Shape {
        Shape::from_coords(&[[0., 0.], [size, 0.], [size, size], [0., size]])
    }

    #[test]
    fn test_bounds() {
        let shape = Shape::from_coords(&[[1., -2.], [4., 0.], [3., 5.], [-1., 2.]]);
        let bounds = shape.bounds().unwrap();
        assert_eq!(
            bounds,
            Rect {
                min_x: -1.,
                min_y: -2.,
                max_x: 4.,
                max_y: 5.
            }
        );
        assert_eq!(bounds.width(), 5.);
        assert_eq!(bounds.height(), 7.);
        assert!(Shape::default().bounds().is_none());
    }

    #[test]
    fn test_contains_with_hole() {
        let mut shape = square(4.);
        shape.add_hole(Shape::from_coords(&[[1., 1.], [3., 1.], [3., 3.], [1., 3.]]));

        assert!(shape.contains(Point::new(0.5, 0.5)));
        assert!(shape.contains(Point::new(3.5, 2.)));
        assert!(!shape.contains(Point::new(2., 2.)));
        assert!(!shape.contains(Point::new(5., 2.)));
        assert!(!shape.contains(Point::new(-0.1, 2.)));

        assert!(shape.contains_shape(&Shape::from_coords(&[
            [0.5, 0.5],
            [3.5, 0.5],
            [3.5, 0.8]
        ])));
        assert!(!shape.contains_shape(&Shape::from_coords(&[
            [0.5, 0.5],
            [2., 2.],
            [3.5, 0.8]
        ])));
    }

    #[test]
    fn test_area() {
        let mut shape = square(4.);
        shape.add_hole(Shape::from_coords(&[[1., 1.], [1., 3.], [3., 3.], [3., 1.]]));
        assert_eq!(shape.area(), 12.);
    }

    #[test]
    fn test_transform() {
        let mut shape = square(1.);
        shape.add_hole(Shape::from_coords(&[
            [0.25, 0.25],
            [0.75, 0.25],
            [0.75, 0.75],
        ]));
        shape.add_steiner_point(Point::new(0.5, 0.25));

        shape.scale_and_offset(Point::new(10., 20.), 2.);
        assert_eq!(shape.points[2], Point::new(12., 22.));
        assert_eq!(shape.holes[0].points[0], Point::new(10.5, 20.5));
        assert_eq!(shape.steiner_points[0], Point::new(11., 20.5));

        shape.offset(Point::new(-10., -20.));
        shape.scale_xy(0.5, 1.);
        assert_eq!(shape.points[2], Point::new(1., 2.));

        let moved = Shape::with_transform(&square(1.).points, Point::new(1., 1.), 3.);
        assert_eq!(moved.points[2], Point::new(4., 4.));
    }

    #[test]
    fn test_normalize_ring() {
        // cw input with a repeated point and a closing point
        let ring = vec![
            Point::new(0., 0.),
            Point::new(0., 1.),
            Point::new(0., 1.),
            Point::new(1., 1.),
            Point::new(1., 0.),
            Point::new(0., 0.),
        ];
        let normalized = normalize_ring(&ring, true).unwrap();
        assert_eq!(normalized.len(), 4);
        assert!(signed_area(&normalized) > 0.);

        let hole = normalize_ring(&normalized, false).unwrap();
        assert!(signed_area(&hole) < 0.);
    }

    #[test]
    fn test_normalize_ring_collapses_collinear() {
        let ring = vec![
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(2., 0.),
            Point::new(2., 2.),
            Point::new(0., 2.),
        ];
        let normalized = normalize_ring(&ring, true).unwrap();
        assert_eq!(normalized.len(), 4);
        assert!(!normalized.contains(&Point::new(1., 0.)));

        let line = vec![Point::new(0., 0.), Point::new(1., 1.), Point::new(2., 2.)];
        assert_eq!(
            normalize_ring(&line, true),
            Err(crate::InputError::TooFewPoints(2))
        );
    }

    #[test]
    fn test_normalize_ring_long_collinear_run() {
        // the ring starts inside a run of 10000 points on the bottom edge,
        // so the run wraps around the seam
        let mut ring = (5000..=10000)
            .map(|i| Point::new(i as f64 * 1e-4, 0.))
            .collect::<Vec<_>>();
        ring.push(Point::new(1., 1.));
        ring.push(Point::new(0., 1.));
        ring.extend((0..5000).map(|i| Point::new(i as f64 * 1e-4, 0.)));

        let normalized = normalize_ring(&ring, true).unwrap();
        assert_eq!(
            normalized,
            vec![
                Point::new(1., 0.),
                Point::new(1., 1.),
                Point::new(0., 1.),
                Point::new(0., 0.),
            ]
        );
    }

    #[test]
    fn test_normalize_ring_rejects_nan() {
        let ring = vec![
            Point::new(0., 0.),
            Point::new(f64::NAN, 0.),
            Point::new(0., 1.),
        ];
        assert!(matches!(
            normalize_ring(&ring, true),
            Err(crate::InputError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_edge_new() {
        let a = Point::new(0., 1.);
        let b = Point::new(5., 0.);
        let edge = Edge::new((PointId(0), &a), (PointId(1), &b)).unwrap();
        assert_eq!(edge.p, PointId(1));
        assert_eq!(edge.q, PointId(0));
        assert!(Edge::new((PointId(0), &a), (PointId(1), &a)).is_none());
    }
}
