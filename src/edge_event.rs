use crate::{
    advancing_front::NodeId,
    errors::ConstraintError,
    utils::{in_scan_area, orient_2d, Orientation},
    Context, Edge, Error, Observer, Point, PointId, Sweeper, TriangleId,
};

/// One pending step of the walk that realizes a constrained edge.
///
/// The walk flips its way through the triangles crossed by the edge. Steps
/// that would recurse push their continuation first, then the nested step.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// walk from `point` of `triangle` toward `ep`
    Edge {
        ep: PointId,
        eq: PointId,
        triangle: TriangleId,
        point: PointId,
    },
    /// flip the edge of `triangle` opposite `p`
    Flip {
        ep: PointId,
        eq: PointId,
        triangle: TriangleId,
        p: PointId,
    },
    /// look for a point to flip toward when the quad is not convex
    Scan {
        ep: PointId,
        eq: PointId,
        flip_triangle: TriangleId,
        triangle: TriangleId,
        p: PointId,
    },
}

/// Edge event related methods
impl Sweeper {
    pub(crate) fn edge_event(
        edge: Edge,
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        tracing::trace!(p = ?edge.p, q = ?edge.q, "edge event");
        context.begin_edge_event(edge.p, edge.q);

        let triangle = context.node_triangle(node)?;
        if Self::is_edge_side_of_triangle(triangle, edge.p, edge.q, context) {
            return Ok(());
        }

        // For now we will do all needed filling
        Self::fill_edge_event(edge, node, context, observer)?;

        let triangle = context.node_triangle(node)?;
        Self::walk(
            Step::Edge {
                ep: edge.p,
                eq: edge.q,
                triangle,
                point: edge.q,
            },
            context,
            observer,
        )
    }

    /// Whether `ep`-`eq` already is an edge of the triangle. Marks it
    /// constrained when it is the edge being realized.
    fn is_edge_side_of_triangle(
        triangle_id: TriangleId,
        ep: PointId,
        eq: PointId,
        context: &mut Context,
    ) -> bool {
        let Some(triangle) = context.triangles.get(triangle_id) else {
            return false;
        };
        if triangle.edge_index(ep, eq).is_none() {
            return false;
        }

        // a helper edge of a scan is not a constraint
        if context.edge_event.is_constraint(ep, eq) {
            context.triangles.mark_constrained(triangle_id, ep, eq);
        }
        true
    }

    fn walk(initial: Step, context: &mut Context, observer: &mut impl Observer) -> Result<(), Error> {
        let mut pending = vec![initial];

        while let Some(step) = pending.pop() {
            context.edge_event_step()?;

            match step {
                Step::Edge {
                    ep,
                    eq,
                    triangle,
                    point,
                } => Self::edge_step(ep, eq, triangle, point, context, &mut pending)?,
                Step::Flip { ep, eq, triangle, p } => {
                    Self::flip_step(ep, eq, triangle, p, context, observer, &mut pending)?
                }
                Step::Scan {
                    ep,
                    eq,
                    flip_triangle,
                    triangle,
                    p,
                } => Self::scan_step(ep, eq, flip_triangle, triangle, p, context, &mut pending)?,
            }
        }

        Ok(())
    }

    fn edge_step(
        ep: PointId,
        eq: PointId,
        triangle_id: TriangleId,
        point: PointId,
        context: &mut Context,
        pending: &mut Vec<Step>,
    ) -> Result<(), Error> {
        let triangle = *Self::walk_triangle(triangle_id, point, context)?;

        if Self::is_edge_side_of_triangle(triangle_id, ep, eq, context) {
            return Ok(());
        }

        let p1 = triangle.point_ccw(point);
        let o1 = orient_2d(context.points.get(eq), context.points.get(p1), context.points.get(ep));
        if o1.is_collinear() {
            return Self::collinear_step(ep, eq, triangle_id, point, p1, context, pending);
        }

        let p2 = triangle.point_cw(point);
        let o2 = orient_2d(context.points.get(eq), context.points.get(p2), context.points.get(ep));
        if o2.is_collinear() {
            return Self::collinear_step(ep, eq, triangle_id, point, p2, context, pending);
        }

        if o1 == o2 {
            // Need to decide if we are rotating CW or CCW to get to a triangle
            // that will cross edge
            let triangle_id = if o1.is_cw() {
                triangle.neighbor_ccw(point)
            } else {
                triangle.neighbor_cw(point)
            };
            pending.push(Step::Edge {
                ep,
                eq,
                triangle: triangle_id,
                point,
            });
        } else {
            // This triangle crosses constraint so lets flippin start!
            pending.push(Step::Flip {
                ep,
                eq,
                triangle: triangle_id,
                p: point,
            });
        }

        Ok(())
    }

    /// `collinear` lies on the edge `ep`-`eq`. When it shares a triangle edge
    /// with `eq`, that part is done and the rest `ep`-`collinear` is walked.
    fn collinear_step(
        ep: PointId,
        eq: PointId,
        triangle_id: TriangleId,
        point: PointId,
        collinear: PointId,
        context: &mut Context,
        pending: &mut Vec<Step>,
    ) -> Result<(), Error> {
        let triangle = *context.triangles.get_unchecked(triangle_id);
        if !triangle.contains_pair(eq, collinear) {
            return Err(ConstraintError::CollinearUnsupported(collinear).into());
        }

        if ep == context.edge_event.p && eq == context.edge_event.q {
            context.triangles.mark_constrained(triangle_id, eq, collinear);
            // the remaining part is the edge now
            context.edge_event.q = collinear;
        }

        pending.push(Step::Edge {
            ep,
            eq: collinear,
            triangle: triangle.neighbor_across(point),
            point: collinear,
        });
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn flip_step(
        ep: PointId,
        eq: PointId,
        triangle_id: TriangleId,
        p: PointId,
        context: &mut Context,
        observer: &mut impl Observer,
        pending: &mut Vec<Step>,
    ) -> Result<(), Error> {
        let t = *Self::walk_triangle(triangle_id, p, context)?;
        let ot_id = t.neighbor_across(p);
        let Some(ot) = context.triangles.get(ot_id).copied() else {
            return Err(ConstraintError::MissingNeighbor { p: ep, q: eq }.into());
        };

        // the edge to flip is crossed by the constraint
        if t.constrained_edge[t.point_index(p).unwrap_or_default()] {
            return Err(ConstraintError::CrossesConstraint {
                p: context.edge_event.p,
                q: context.edge_event.q,
            }
            .into());
        }

        let op = ot.opposite_point(&t, p);
        let points = context.points;

        if in_scan_area(
            points.get(p),
            points.get(t.point_ccw(p)),
            points.get(t.point_cw(p)),
            points.get(op),
        ) {
            // lets rotate shared edge one vertex CW
            context.triangles.rotate_triangle_pair(triangle_id, p, ot_id, op);
            context.map_triangle_to_nodes(triangle_id);
            context.map_triangle_to_nodes(ot_id);

            if p == eq && op == ep {
                if eq == context.edge_event.q && ep == context.edge_event.p {
                    context.triangles.mark_constrained(triangle_id, ep, eq);
                    Self::legalize(triangle_id, context, observer)?;
                    Self::legalize(ot_id, context, observer)?;
                }
                // a helper edge needs no more work, the walk continues
                // with what is pending
            } else {
                let o = orient_2d(points.get(eq), points.get(op), points.get(ep));
                let triangle_id =
                    Self::next_flip_triangle(o, triangle_id, ot_id, p, op, context, observer)?;
                pending.push(Step::Flip {
                    ep,
                    eq,
                    triangle: triangle_id,
                    p,
                });
            }
        } else {
            let new_p = Self::next_flip_point(ep, eq, ot_id, op, context)?;
            pending.push(Step::Edge {
                ep,
                eq,
                triangle: triangle_id,
                point: p,
            });
            pending.push(Step::Scan {
                ep,
                eq,
                flip_triangle: triangle_id,
                triangle: ot_id,
                p: new_p,
            });
        }

        Ok(())
    }

    /// After a flip one of the two triangles no longer crosses the edge.
    /// Legalize it and return the one that still does.
    #[allow(clippy::too_many_arguments)]
    fn next_flip_triangle(
        o: Orientation,
        triangle_id: TriangleId,
        ot_id: TriangleId,
        p: PointId,
        op: PointId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<TriangleId, Error> {
        let (done, next) = if o.is_ccw() {
            // ot is not crossing edge after flip
            (ot_id, triangle_id)
        } else {
            // t is not crossing edge after flip
            (triangle_id, ot_id)
        };

        let done_triangle = context.triangles.get_mut_unchecked(done);
        if let Some(idx) = done_triangle.edge_index(p, op) {
            done_triangle.delaunay_edge[idx] = true;
        }
        // flags are cleared once the legalization is done
        Self::legalize(done, context, observer)?;

        Ok(next)
    }

    /// When we need to traverse from one triangle to the next we need
    /// the point in current triangle that is the opposite point to the next
    /// triangle.
    fn next_flip_point(
        ep: PointId,
        eq: PointId,
        ot_id: TriangleId,
        op: PointId,
        context: &Context,
    ) -> Result<PointId, Error> {
        let ot = context.triangles.get_unchecked(ot_id);
        let points = context.points;
        match orient_2d(points.get(eq), points.get(op), points.get(ep)) {
            // Right
            Orientation::CW => Ok(ot.point_ccw(op)),
            // Left
            Orientation::CCW => Ok(ot.point_cw(op)),
            Orientation::Collinear => Err(ConstraintError::CollinearUnsupported(op).into()),
        }
    }

    /// Scan part of the flip, when the quad is not convex look for the next
    /// point that can be flipped toward, then flip a helper edge from `eq`
    /// to it.
    #[allow(clippy::too_many_arguments)]
    fn scan_step(
        ep: PointId,
        eq: PointId,
        flip_triangle_id: TriangleId,
        triangle_id: TriangleId,
        p: PointId,
        context: &mut Context,
        pending: &mut Vec<Step>,
    ) -> Result<(), Error> {
        let t = *Self::walk_triangle(triangle_id, p, context)?;
        let ot_id = t.neighbor_across(p);
        let Some(ot) = context.triangles.get(ot_id).copied() else {
            return Err(ConstraintError::MissingNeighbor { p: ep, q: eq }.into());
        };
        let op = ot.opposite_point(&t, p);

        let flip_triangle = *Self::walk_triangle(flip_triangle_id, eq, context)?;
        let points = context.points;

        if in_scan_area(
            points.get(eq),
            points.get(flip_triangle.point_ccw(eq)),
            points.get(flip_triangle.point_cw(eq)),
            points.get(op),
        ) {
            // flip with new edge op->eq
            pending.push(Step::Flip {
                ep: eq,
                eq: op,
                triangle: ot_id,
                p: op,
            });
        } else {
            let new_p = Self::next_flip_point(ep, eq, ot_id, op, context)?;
            pending.push(Step::Scan {
                ep,
                eq,
                flip_triangle: flip_triangle_id,
                triangle: ot_id,
                p: new_p,
            });
        }

        Ok(())
    }

    /// Triangle the walk is in, which must hold `point`
    fn walk_triangle<'c>(
        triangle_id: TriangleId,
        point: PointId,
        context: &'c Context,
    ) -> Result<&'c crate::InnerTriangle, Error> {
        match context.triangles.get(triangle_id) {
            Some(triangle) if triangle.contains(point) => Ok(triangle),
            Some(_) => Err(Error::Degeneracy("edge walk lost track of its point")),
            None => Err(ConstraintError::MissingNeighbor {
                p: context.edge_event.p,
                q: context.edge_event.q,
            }
            .into()),
        }
    }
}

/// Filling of the front below the edge, so the walk stays inside triangles
impl Sweeper {
    fn fill_edge_event(
        edge: Edge,
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        if context.edge_event.right {
            Self::fill_right_above_edge_event(edge, node, context, observer)
        } else {
            Self::fill_left_above_edge_event(edge, node, context, observer)
        }
    }

    fn point(node: NodeId, context: &Context) -> Point {
        context.advancing_front.point(node)
    }

    fn fill_right_above_edge_event(
        edge: Edge,
        mut node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let edge_p = context.points.get(edge.p);
        let edge_q = context.points.get(edge.q);

        loop {
            context.edge_event_step()?;
            let next = context.next_node(node)?;
            let next_point = Self::point(next, context);
            if next_point.x >= edge_p.x {
                return Ok(());
            }

            // Check if next node is below the edge
            if orient_2d(edge_q, next_point, edge_p).is_ccw() {
                Self::fill_right_below_edge_event(edge, node, context, observer)?;
            } else {
                node = next;
            }
        }
    }

    fn fill_right_below_edge_event(
        edge: Edge,
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let edge_p = context.points.get(edge.p);

        loop {
            context.edge_event_step()?;
            if Self::point(node, context).x >= edge_p.x {
                return Ok(());
            }

            let next = context.next_node(node)?;
            let next_next = context.next_node(next)?;
            if orient_2d(
                Self::point(node, context),
                Self::point(next, context),
                Self::point(next_next, context),
            )
            .is_ccw()
            {
                // Concave
                return Self::fill_right_concave_edge_event(edge, node, context, observer);
            }

            // Convex
            Self::fill_right_convex_edge_event(edge, node, context, observer)?;
            // Retry this one
        }
    }

    fn fill_right_concave_edge_event(
        edge: Edge,
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let edge_p = context.points.get(edge.p);
        let edge_q = context.points.get(edge.q);

        loop {
            context.edge_event_step()?;
            let next = context.next_node(node)?;
            Self::fill(next, context, observer)?;

            let next = context.next_node(node)?;
            if context.advancing_front.point_id(next) == edge.p {
                return Ok(());
            }

            // Next above or below edge?
            let next_point = Self::point(next, context);
            if !orient_2d(edge_q, next_point, edge_p).is_ccw() {
                return Ok(());
            }

            // Below
            let next_next = context.next_node(next)?;
            if !orient_2d(
                Self::point(node, context),
                next_point,
                Self::point(next_next, context),
            )
            .is_ccw()
            {
                return Ok(());
            }
            // Next is concave
        }
    }

    fn fill_right_convex_edge_event(
        edge: Edge,
        mut node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let edge_p = context.points.get(edge.p);
        let edge_q = context.points.get(edge.q);

        loop {
            context.edge_event_step()?;
            let next = context.next_node(node)?;
            let next_next = context.next_node(next)?;
            let next_next_next = context.next_node(next_next)?;

            // Next concave or convex?
            if orient_2d(
                Self::point(next, context),
                Self::point(next_next, context),
                Self::point(next_next_next, context),
            )
            .is_ccw()
            {
                // Concave
                return Self::fill_right_concave_edge_event(edge, next, context, observer);
            }

            // Convex
            // Next above or below edge?
            if orient_2d(edge_q, Self::point(next_next, context), edge_p).is_ccw() {
                // Below
                node = next;
            } else {
                // Above
                return Ok(());
            }
        }
    }

    fn fill_left_above_edge_event(
        edge: Edge,
        mut node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let edge_p = context.points.get(edge.p);
        let edge_q = context.points.get(edge.q);

        loop {
            context.edge_event_step()?;
            let prev = context.prev_node(node)?;
            let prev_point = Self::point(prev, context);
            if prev_point.x <= edge_p.x {
                return Ok(());
            }

            // Check if next node is below the edge
            if orient_2d(edge_q, prev_point, edge_p).is_cw() {
                Self::fill_left_below_edge_event(edge, node, context, observer)?;
            } else {
                node = prev;
            }
        }
    }

    fn fill_left_below_edge_event(
        edge: Edge,
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let edge_p = context.points.get(edge.p);

        loop {
            context.edge_event_step()?;
            if Self::point(node, context).x <= edge_p.x {
                return Ok(());
            }

            let prev = context.prev_node(node)?;
            let prev_prev = context.prev_node(prev)?;
            if orient_2d(
                Self::point(node, context),
                Self::point(prev, context),
                Self::point(prev_prev, context),
            )
            .is_cw()
            {
                // Concave
                return Self::fill_left_concave_edge_event(edge, node, context, observer);
            }

            // Convex
            Self::fill_left_convex_edge_event(edge, node, context, observer)?;
            // Retry this one
        }
    }

    fn fill_left_concave_edge_event(
        edge: Edge,
        node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let edge_p = context.points.get(edge.p);
        let edge_q = context.points.get(edge.q);

        loop {
            context.edge_event_step()?;
            let prev = context.prev_node(node)?;
            Self::fill(prev, context, observer)?;

            let prev = context.prev_node(node)?;
            if context.advancing_front.point_id(prev) == edge.p {
                return Ok(());
            }

            // Next above or below edge?
            let prev_point = Self::point(prev, context);
            if !orient_2d(edge_q, prev_point, edge_p).is_cw() {
                return Ok(());
            }

            // Below
            let prev_prev = context.prev_node(prev)?;
            if !orient_2d(
                Self::point(node, context),
                prev_point,
                Self::point(prev_prev, context),
            )
            .is_cw()
            {
                return Ok(());
            }
            // Next is concave
        }
    }

    fn fill_left_convex_edge_event(
        edge: Edge,
        mut node: NodeId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let edge_p = context.points.get(edge.p);
        let edge_q = context.points.get(edge.q);

        loop {
            context.edge_event_step()?;
            let prev = context.prev_node(node)?;
            let prev_prev = context.prev_node(prev)?;
            let prev_prev_prev = context.prev_node(prev_prev)?;

            // Next concave or convex?
            if orient_2d(
                Self::point(prev, context),
                Self::point(prev_prev, context),
                Self::point(prev_prev_prev, context),
            )
            .is_cw()
            {
                // Concave
                return Self::fill_left_concave_edge_event(edge, prev, context, observer);
            }

            // Convex
            // Next above or below edge?
            if orient_2d(edge_q, Self::point(prev_prev, context), edge_p).is_cw() {
                // Below
                node = prev;
            } else {
                // Above
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ConstraintError, Error, Point, SweeperBuilder};

    #[test]
    fn test_edge_over_lower_points() {
        // the top edge ends left of the notch, its edge event has to
        // fill and flip below it
        let triangulation = SweeperBuilder::new(vec![
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(10., 10.),
            Point::new(-0.5, 9.),
            Point::new(6., 6.),
            Point::new(4., 4.5),
            Point::new(-10., 5.),
        ])
        .build()
        .unwrap()
        .triangulate()
        .unwrap();

        assert_eq!(triangulation.len(), 5);
        assert!((triangulation.area() - 103.).abs() < 1e-9);
    }

    #[test]
    fn test_step_limit() {
        let result = SweeperBuilder::new(vec![
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(10., 10.),
            Point::new(5., 2.),
            Point::new(0., 10.),
        ])
        .config(crate::Config::default().edge_event_step_limit(0))
        .build()
        .unwrap()
        .triangulate();

        assert!(matches!(
            result,
            Err(Error::Constraint(ConstraintError::NonTermination { limit: 0, .. }))
        ));
    }
}
