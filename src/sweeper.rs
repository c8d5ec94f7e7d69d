use rustc_hash::FxHashSet;

use crate::{
    advancing_front::NodeId,
    context::Basin,
    errors::InputError,
    points::PointsBuilder,
    triangles::InnerTriangle,
    utils::{orient_2d, signed_area, Angle},
    validate, Config, Context, Edge, Edges, Error, Observer, Point, PointId, Points,
    Triangulation,
};

/// Collects the outline, holes and steiner points of one shape.
///
/// ```rust
/// use sweep_cdt::{Point, SweeperBuilder};
///
/// let sweeper = SweeperBuilder::new(vec![
///     Point::new(0., 0.),
///     Point::new(4., 0.),
///     Point::new(4., 4.),
///     Point::new(0., 4.),
/// ])
/// .add_hole(vec![
///     Point::new(1., 1.),
///     Point::new(1., 3.),
///     Point::new(3., 3.),
///     Point::new(3., 1.),
/// ])
/// .build()
/// .unwrap();
///
/// let triangulation = sweeper.triangulate().unwrap();
/// assert_eq!(triangulation.len(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct SweeperBuilder {
    outline: Vec<Point>,
    holes: Vec<Vec<Point>>,
    steiner_points: Vec<Point>,
    config: Config,
}

impl SweeperBuilder {
    pub fn new(outline: Vec<Point>) -> Self {
        Self {
            outline,
            holes: Vec::new(),
            steiner_points: Vec::new(),
            config: Config::default(),
        }
    }

    pub fn add_hole(mut self, hole: Vec<Point>) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn add_holes(mut self, holes: impl IntoIterator<Item = Vec<Point>>) -> Self {
        self.holes.extend(holes);
        self
    }

    pub fn add_steiner_point(mut self, point: Point) -> Self {
        self.steiner_points.push(point);
        self
    }

    pub fn add_steiner_points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.steiner_points.extend(points);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Check the input, merge duplicated points and build the edge list.
    pub fn build(self) -> Result<Sweeper, Error> {
        let Self {
            outline,
            holes,
            steiner_points,
            config,
        } = self;

        if let Some(p) = outline
            .iter()
            .chain(holes.iter().flatten())
            .chain(steiner_points.iter())
            .find(|p| !p.is_finite())
        {
            return Err(InputError::NonFinite { x: p.x, y: p.y }.into());
        }

        for ring in std::iter::once(&outline).chain(holes.iter()) {
            let distinct = ring.iter().map(Point::key).collect::<FxHashSet<_>>().len();
            if distinct < 3 || signed_area(ring) == 0. {
                return Err(InputError::TooFewPoints(distinct).into());
            }
        }

        if config.validate {
            validate::validate(&outline, &holes, &steiner_points)?;
        }

        let capacity =
            outline.len() + holes.iter().map(Vec::len).sum::<usize>() + steiner_points.len();
        let mut builder = PointsBuilder::with_capacity(capacity);
        let mut ring_edges = Vec::with_capacity(capacity);
        for ring in std::iter::once(&outline).chain(holes.iter()) {
            let ids = ring
                .iter()
                .map(|p| builder.add_point(*p))
                .collect::<Vec<_>>();
            for (i, id) in ids.iter().enumerate() {
                ring_edges.push((*id, ids[(i + 1) % ids.len()]));
            }
        }
        for p in steiner_points {
            builder.add_point(p);
        }

        let (points, remap) = builder.build();
        let edges = Edges::new(
            ring_edges.into_iter().filter_map(|(a, b)| {
                let (a, b) = (remap[a], remap[b]);
                Edge::new((a, &points.get(a)), (b, &points.get(b)))
            }),
            points.len(),
        );

        tracing::debug!(
            points = points.real_len(),
            edges = edges.len(),
            holes = holes.len(),
            "sweeper built"
        );

        Ok(Sweeper {
            points,
            edges,
            config,
        })
    }
}

/// Prepared input of one triangulation. Triangulating does not consume it,
/// so the same sweeper can run again, e.g. with an observer attached.
#[derive(Debug, Clone)]
pub struct Sweeper {
    points: Points,
    edges: Edges,
    config: Config,
}

impl Sweeper {
    pub fn points(&self) -> &Points {
        &self.points
    }

    pub fn edges(&self) -> &Edges {
        &self.edges
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn triangulate(&self) -> Result<Triangulation, Error> {
        self.triangulate_with_observer(&mut ())
    }

    /// Run the triangulation, calling `observer` at every step.
    pub fn triangulate_with_observer(
        &self,
        observer: &mut impl Observer,
    ) -> Result<Triangulation, Error> {
        let mut context = Context::new(&self.points, &self.edges, self.config);

        Self::sweep_points(&mut context, observer)?;
        Self::legalize_all(&mut context, observer)?;
        observer.sweep_done(&context);

        Self::finalize_polygon(&mut context);
        observer.finalized(&context);

        tracing::debug!(
            triangles = context.triangles.len(),
            result = context.result.len(),
            "triangulated"
        );

        Triangulation::new(&context)
    }

    fn sweep_points(context: &mut Context, observer: &mut impl Observer) -> Result<(), Error> {
        let points = context.points;
        let edges = context.edges;

        for (point_id, point) in points.iter_point_by_y(1) {
            let node = Self::point_event(point_id, point, context, observer)?;
            observer.point_event(point_id, context);

            for p in edges.p_for_q(point_id) {
                let edge = Edge { p: *p, q: point_id };
                Self::edge_event(edge, node, context, observer)?;
                observer.edge_event(edge, context);
            }
        }

        Ok(())
    }

    /// Find closes node to the left of the new point and
    /// create a new triangle. If needed new holes and basins
    /// will be filled to.
    fn point_event(
        point_id: PointId,
        point: Point,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<NodeId, Error> {
        tracing::trace!(?point_id, x = point.x, y = point.y, "point event");

        let node = context
            .advancing_front
            .locate_node(point.x)
            .ok_or(Error::Degeneracy("point is outside of the advancing front"))?;
        let node_point = context.advancing_front.point(node);

        let new_node = Self::new_front_triangle(point_id, node, context, observer)?;

        // the located node is never right of the point, so this only
        // holds when the point is straight above it
        if point.x <= node_point.x {
            Self::fill(node, context, observer)?;
        }

        Self::fill_advancing_front(new_node, context, observer)?;
        Ok(new_node)
    }

    /// Create the triangle between `point_id` and the front edge starting
    /// at `node`, and put the point on the front.
    fn new_front_triangle(
        point_id: PointId,
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<NodeId, Error> {
        let next = context.next_node(node)?;
        let node_triangle = context.node_triangle(node)?;

        let triangle = context.triangles.insert(InnerTriangle::new(
            point_id,
            context.advancing_front.point_id(node),
            context.advancing_front.point_id(next),
        ));
        if !context.triangles.mark_neighbor(triangle, node_triangle) {
            return Err(Error::Degeneracy("front triangle does not match its node"));
        }

        let new_node =
            context
                .advancing_front
                .insert_after(node, point_id, context.points, triangle);

        Self::legalize(triangle, context, observer)?;
        Ok(new_node)
    }

    /// Adds a triangle to the advancing front to fill a hole.
    pub(crate) fn fill(
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let prev = context.prev_node(node)?;
        let next = context.next_node(node)?;
        let prev_triangle = context.node_triangle(prev)?;
        let node_triangle = context.node_triangle(node)?;

        let triangle = context.triangles.insert(InnerTriangle::new(
            context.advancing_front.point_id(prev),
            context.advancing_front.point_id(node),
            context.advancing_front.point_id(next),
        ));

        if !(context.triangles.mark_neighbor(triangle, prev_triangle)
            && context.triangles.mark_neighbor(triangle, node_triangle))
        {
            return Err(Error::Degeneracy("front triangle does not match its node"));
        }

        // update the advancing front
        context.advancing_front.remove(node);

        // If it was legalized the triangle has already been mapped
        Self::legalize(triangle, context, observer)
    }

    /// Fills holes in the Advancing Front
    fn fill_advancing_front(
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        // fill right holes
        let mut current = context.advancing_front.next(node);
        while let Some(n) = current {
            if context.advancing_front.next(n).is_none() {
                break;
            }
            // if HoleAngle exceeds 90 degrees then break
            if Self::large_hole_dont_fill(n, context) {
                break;
            }
            Self::fill(n, context, observer)?;
            // a filled node keeps its links
            current = context.advancing_front.next(n);
        }

        // fill left holes
        let mut current = context.advancing_front.prev(node);
        while let Some(n) = current {
            if context.advancing_front.prev(n).is_none() {
                break;
            }
            if Self::large_hole_dont_fill(n, context) {
                break;
            }
            Self::fill(n, context, observer)?;
            current = context.advancing_front.prev(n);
        }

        // fill right basins
        if let Some(angle) = Self::basin_angle(node, context) {
            if angle < std::f64::consts::FRAC_PI_4 * 3. {
                Self::fill_basin(node, context, observer)?;
            }
        }

        Ok(())
    }

    /// Whether the hole at `node` is too wide to fill with one triangle
    fn large_hole_dont_fill(node: NodeId, context: &Context) -> bool {
        let front = &context.advancing_front;
        let (Some(next), Some(prev)) = (front.next(node), front.prev(node)) else {
            return true;
        };
        let node_point = front.point(node);

        let angle = Angle::new(node_point, front.point(next), front.point(prev));
        if !angle.exceeds_90_degree() {
            return false;
        }
        if angle.is_negative() {
            return true;
        }

        // check additional points on front, only angles on the same side as
        // the added point matter
        if let Some(next2) = front.next(next) {
            let angle = Angle::new(node_point, front.point(next2), front.point(prev));
            if !angle.exceeds_plus_90_degree_or_is_negative() {
                return false;
            }
        }
        if let Some(prev2) = front.prev(prev) {
            let angle = Angle::new(node_point, front.point(next), front.point(prev2));
            if !angle.exceeds_plus_90_degree_or_is_negative() {
                return false;
            }
        }

        true
    }
}

/// Basin related methods
impl Sweeper {
    fn basin_angle(node: NodeId, context: &Context) -> Option<f64> {
        let front = &context.advancing_front;
        let next = front.next(node)?;
        let next_next = front.next(next)?;

        let node_point = front.point(node);
        let next_next_point = front.point(next_next);
        let ax = node_point.x - next_next_point.x;
        let ay = node_point.y - next_next_point.y;
        Some(ay.atan2(ax))
    }

    /// basin is like a bowl, we first identify it's left, bottom, right node.
    /// then fill it
    fn fill_basin(
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let front = &context.advancing_front;
        let next = context.next_node(node)?;
        let next_next = context.next_node(next)?;

        // find the left
        let left = if orient_2d(front.point(node), front.point(next), front.point(next_next))
            .is_ccw()
        {
            next_next
        } else {
            next
        };

        // find the bottom
        let mut bottom = left;
        while let Some(n) = front.next(bottom) {
            if front.point(bottom).y >= front.point(n).y {
                bottom = n;
            } else {
                break;
            }
        }
        // no valid basin
        if bottom == left {
            return Ok(());
        }

        // find the right
        let mut right = bottom;
        while let Some(n) = front.next(right) {
            if front.point(right).y < front.point(n).y {
                right = n;
            } else {
                break;
            }
        }
        // no valid basin
        if right == bottom {
            return Ok(());
        }

        let left_point = front.point(left);
        let right_point = front.point(right);
        context.basin = Some(Basin {
            left,
            bottom,
            right,
            width: right_point.x - left_point.x,
            left_highest: left_point.y > right_point.y,
        });

        let result = Self::fill_basin_req(context, observer);
        context.basin = None;
        result
    }

    fn fill_basin_req(context: &mut Context, observer: &mut impl Observer) -> Result<(), Error> {
        let Some(basin) = context.basin else {
            return Ok(());
        };
        let mut node = basin.bottom;

        loop {
            // stop fill if basin is shallow
            if Self::is_shallow(node, &basin, context) {
                return Ok(());
            }

            Self::fill(node, context, observer)?;

            // the filled node still links to its old neighbors
            let prev = context.prev_node(node)?;
            let next = context.next_node(node)?;

            if prev == basin.left && next == basin.right {
                return Ok(());
            }

            let front = &context.advancing_front;
            node = if prev == basin.left {
                let next_next = context.next_node(next)?;
                if orient_2d(front.point(node), front.point(next), front.point(next_next)).is_cw() {
                    return Ok(());
                }
                next
            } else if next == basin.right {
                let prev_prev = context.prev_node(prev)?;
                if orient_2d(front.point(node), front.point(prev), front.point(prev_prev)).is_ccw() {
                    return Ok(());
                }
                prev
            } else if front.point(prev).y < front.point(next).y {
                // continue with the neighbor node with lowest Y value
                prev
            } else {
                next
            };
        }
    }

    fn is_shallow(node: NodeId, basin: &Basin, context: &Context) -> bool {
        let front = &context.advancing_front;
        let height = if basin.left_highest {
            front.point(basin.left).y - front.point(node).y
        } else {
            front.point(basin.right).y - front.point(node).y
        };

        // if shallow stop filling
        basin.width > height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InputError;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0., 0.),
            Point::new(1., 0.),
            Point::new(1., 1.),
            Point::new(0., 1.),
        ]
    }

    #[test]
    fn test_build_merges_duplicates() {
        let sweeper = SweeperBuilder::new(square())
            .add_steiner_point(Point::new(1., 1.))
            .add_steiner_point(Point::new(0.5, 0.5))
            .build()
            .unwrap();

        assert_eq!(sweeper.points().real_len(), 5);
        assert_eq!(sweeper.edges().len(), 4);
    }

    #[test]
    fn test_build_rejects_bad_input() {
        assert_eq!(
            SweeperBuilder::new(vec![Point::new(0., 0.), Point::new(1., 0.), Point::new(0., 0.)])
                .build()
                .unwrap_err(),
            Error::Input(InputError::TooFewPoints(2))
        );

        assert_eq!(
            SweeperBuilder::new(vec![Point::new(0., 0.), Point::new(1., 1.), Point::new(2., 2.)])
                .build()
                .unwrap_err(),
            Error::Input(InputError::TooFewPoints(3))
        );

        let mut outline = square();
        outline[2] = Point::new(f64::NAN, 1.);
        assert!(matches!(
            SweeperBuilder::new(outline).build().unwrap_err(),
            Error::Input(InputError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_sweeper_is_reusable() {
        let sweeper = SweeperBuilder::new(square()).build().unwrap();
        let first = sweeper.triangulate().unwrap();
        let second = sweeper.triangulate().unwrap();
        assert_eq!(first.triangle_indices(), second.triangle_indices());
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_basin_is_filled() {
        // a V shaped valley between two peaks, the bottom gets filled
        let sweeper = SweeperBuilder::new(vec![
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(10., 6.),
            Point::new(7., 1.),
            Point::new(5., 0.5),
            Point::new(3., 1.),
            Point::new(0., 6.),
        ])
        .build()
        .unwrap();

        let triangulation = sweeper.triangulate().unwrap();
        assert_eq!(triangulation.len(), 5);
        assert!((triangulation.area() - 24.).abs() < 1e-9);
    }

    #[derive(Default)]
    struct CountObserver {
        point_events: usize,
        edge_events: usize,
        legalizations: usize,
        done: bool,
    }

    impl Observer for CountObserver {
        fn point_event(&mut self, _point_id: PointId, _context: &Context) {
            self.point_events += 1;
        }

        fn edge_event(&mut self, _edge: Edge, _context: &Context) {
            self.edge_events += 1;
        }

        fn legalized(&mut self, _triangle_id: crate::TriangleId, _context: &Context) {
            self.legalizations += 1;
        }

        fn finalized(&mut self, context: &Context) {
            self.done = true;
            assert_eq!(context.result.len(), 4);
        }
    }

    #[test]
    fn test_observer() {
        let sweeper = SweeperBuilder::new(square())
            .add_steiner_point(Point::new(0.5, 0.5))
            .build()
            .unwrap();

        let mut observer = CountObserver::default();
        sweeper.triangulate_with_observer(&mut observer).unwrap();

        // the first point seeds the front
        assert_eq!(observer.point_events, 4);
        assert_eq!(observer.edge_events, 4);
        assert!(observer.legalizations >= 4);
        assert!(observer.done);
    }
}
