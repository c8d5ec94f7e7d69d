use crate::{
    advancing_front::{AdvancingFront, NodeId},
    errors::ConstraintError,
    triangles::InnerTriangle,
    Config, Edges, Error, PointId, Points, TriangleId, Triangles,
};

/// Concave notch in the advancing front, filled during a point event
#[derive(Debug, Clone, Copy)]
pub(crate) struct Basin {
    pub left: NodeId,
    pub bottom: NodeId,
    pub right: NodeId,
    pub width: f64,
    pub left_highest: bool,
}

/// The constrained edge currently being realized
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeEventState {
    /// lower end
    pub p: PointId,
    /// higher end, moves down when a collinear point splits the edge
    pub q: PointId,
    /// whether p is right of q
    pub right: bool,
    pub steps: usize,
    pub step_limit: usize,
}

impl EdgeEventState {
    /// whether `ep`-`eq` is the edge being realized, in either direction
    pub fn is_constraint(&self, ep: PointId, eq: PointId) -> bool {
        (ep == self.p && eq == self.q) || (ep == self.q && eq == self.p)
    }
}

/// All state of one triangulation run
pub struct Context<'a> {
    pub points: &'a Points,
    pub edges: &'a Edges,
    pub triangles: Triangles,
    pub advancing_front: AdvancingFront,
    /// interior triangles, filled by the finalizer
    pub result: Vec<TriangleId>,

    pub(crate) config: Config,
    pub(crate) basin: Option<Basin>,
    pub(crate) edge_event: EdgeEventState,

    // reusable legalize task queue to reduce alloc overhead
    pub(crate) legalize_task_queue: Vec<TriangleId>,
    // triangles touched by one legalization
    pub(crate) legalize_touched: Vec<TriangleId>,
}

impl<'a> Context<'a> {
    /// Create the context with the seed triangle and the initial front.
    /// `points` must hold at least one real point.
    pub fn new(points: &'a Points, edges: &'a Edges, config: Config) -> Self {
        let mut triangles = Triangles::with_capacity(points.len() * 2);
        let initial_triangle = triangles.insert(InnerTriangle::new(
            points.first_id(),
            points.head,
            points.tail,
        ));

        let advancing_front = AdvancingFront::new(
            triangles.get_unchecked(initial_triangle),
            initial_triangle,
            points,
        );

        Self {
            points,
            edges,
            triangles,
            advancing_front,
            result: Vec::with_capacity(points.len()),

            config,
            basin: None,
            edge_event: EdgeEventState {
                p: points.first_id(),
                q: points.first_id(),
                right: false,
                steps: 0,
                step_limit: 0,
            },

            legalize_task_queue: Vec::with_capacity(32),
            legalize_touched: Vec::with_capacity(32),
        }
    }

    /// Point the front nodes at `triangle_id` for each of its edges on the front.
    pub(crate) fn map_triangle_to_nodes(&mut self, triangle_id: TriangleId) {
        let triangle = *self.triangles.get_unchecked(triangle_id);
        for i in 0..3 {
            if triangle.neighbors[i].invalid() {
                let point = triangle.point_cw(triangle.points[i]);
                if let Some(node) = self.advancing_front.locate_point(point) {
                    self.advancing_front.node_mut(node).triangle = Some(triangle_id);
                }
            }
        }
    }

    /// Start realizing the edge `p`-`q`
    pub(crate) fn begin_edge_event(&mut self, p: PointId, q: PointId) {
        let step_limit = self.config.step_limit_for(self.triangles.len());
        self.edge_event = EdgeEventState {
            p,
            q,
            right: self.points.get(p).x > self.points.get(q).x,
            steps: 0,
            step_limit,
        };
    }

    /// Count one step of the current edge event
    pub(crate) fn edge_event_step(&mut self) -> Result<(), Error> {
        self.edge_event.steps += 1;
        if self.edge_event.steps > self.edge_event.step_limit {
            return Err(ConstraintError::NonTermination {
                p: self.edge_event.p,
                q: self.edge_event.q,
                limit: self.edge_event.step_limit,
            }
            .into());
        }
        Ok(())
    }

    /// Triangle of a front node, the last node has none
    pub(crate) fn node_triangle(&self, node: NodeId) -> Result<TriangleId, Error> {
        self.advancing_front
            .node(node)
            .triangle
            .ok_or(Error::Degeneracy("front node has no triangle"))
    }

    pub(crate) fn next_node(&self, node: NodeId) -> Result<NodeId, Error> {
        self.advancing_front
            .next(node)
            .ok_or(Error::Degeneracy("front node has no next node"))
    }

    pub(crate) fn prev_node(&self, node: NodeId) -> Result<NodeId, Error> {
        self.advancing_front
            .prev(node)
            .ok_or(Error::Degeneracy("front node has no prev node"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Point;

    #[test]
    fn test_context_new() {
        let points = Points::new(vec![
            Point::new(0., 0.),
            Point::new(1., 1.),
            Point::new(0., 2.),
        ]);
        let edges = Edges::new(Vec::<crate::Edge>::new(), points.len());
        let context = Context::new(&points, &edges, Config::default());

        assert_eq!(context.triangles.len(), 1);
        assert_eq!(context.advancing_front.len(), 3);

        let head = context.advancing_front.head();
        let middle = context.advancing_front.next(head).unwrap();
        assert_eq!(context.advancing_front.point_id(middle), points.first_id());
        assert!(context.node_triangle(middle).is_ok());
        assert!(context
            .node_triangle(context.advancing_front.tail())
            .is_err());
    }

    #[test]
    fn test_edge_event_step_limit() {
        let points = Points::new(vec![
            Point::new(0., 0.),
            Point::new(1., 1.),
            Point::new(0., 2.),
        ]);
        let edges = Edges::new(Vec::<crate::Edge>::new(), points.len());
        let mut context = Context::new(
            &points,
            &edges,
            Config::default().edge_event_step_limit(2),
        );

        context.begin_edge_event(PointId(0), PointId(2));
        assert!(context.edge_event.is_constraint(PointId(2), PointId(0)));
        assert!(!context.edge_event.right);
        assert!(context.edge_event_step().is_ok());
        assert!(context.edge_event_step().is_ok());
        assert_eq!(
            context.edge_event_step(),
            Err(Error::Constraint(ConstraintError::NonTermination {
                p: PointId(0),
                q: PointId(2),
                limit: 2
            }))
        );
    }
}
