use crate::{points::Points, shape::Point, triangles::TriangleId, InnerTriangle, PointId};

/// Handle of a node in the [`AdvancingFront`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub point_id: PointId,
    pub point: Point,
    /// triangle below the front edge starting at this node,
    /// last node's triangle is None
    pub triangle: Option<TriangleId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

/// Advancing front, a doubly linked list of nodes ordered by x, stored in
/// an arena. Removed nodes stay in the arena and keep their links, so a
/// removed node still knows where its neighbors were.
#[derive(Debug, Clone)]
pub struct AdvancingFront {
    nodes: Vec<Node>,
    /// node for each point currently on the front
    point_node: Vec<Option<NodeId>>,
    head: NodeId,
    tail: NodeId,
    /// last located node, searches start from here
    search_node: NodeId,
    len: usize,
}

impl AdvancingFront {
    /// Create a new advancing front with the initial triangle
    /// Triangle's point order: P0, left sentinel, right sentinel
    pub fn new(triangle: &InnerTriangle, triangle_id: TriangleId, points: &Points) -> Self {
        let mut front = Self {
            nodes: Vec::with_capacity(points.len()),
            point_node: vec![None; points.len()],
            head: NodeId(0),
            tail: NodeId(2),
            search_node: NodeId(0),
            len: 0,
        };

        let head = front.push(triangle.points[1], points, Some(triangle_id));
        let middle = front.push(triangle.points[0], points, Some(triangle_id));
        let tail = front.push(triangle.points[2], points, None);
        front.link(head, middle);
        front.link(middle, tail);

        front.head = head;
        front.tail = tail;
        front.search_node = head;
        front
    }

    fn push(&mut self, point_id: PointId, points: &Points, triangle: Option<TriangleId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            point_id,
            point: points.get(point_id),
            triangle,
            prev: None,
            next: None,
        });
        self.point_node[point_id.as_usize()] = Some(id);
        self.len += 1;
        id
    }

    fn link(&mut self, left: NodeId, right: NodeId) {
        self.nodes[left.0].next = Some(right);
        self.nodes[right.0].prev = Some(left);
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn tail(&self) -> NodeId {
        self.tail
    }

    /// number of nodes currently on the front
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn point(&self, id: NodeId) -> Point {
        self.nodes[id.0].point
    }

    pub fn point_id(&self, id: NodeId) -> PointId {
        self.nodes[id.0].point_id
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev
    }

    /// Insert a node for `point_id` right after `node`.
    pub fn insert_after(
        &mut self,
        node: NodeId,
        point_id: PointId,
        points: &Points,
        triangle_id: TriangleId,
    ) -> NodeId {
        debug_assert!(!triangle_id.invalid());
        let new_node = self.push(point_id, points, Some(triangle_id));
        if let Some(next) = self.next(node) {
            self.link(new_node, next);
        }
        self.link(node, new_node);
        new_node
    }

    /// Unlink `node` from the front. The node keeps its own prev and next.
    pub fn remove(&mut self, node: NodeId) {
        let Node {
            prev,
            next,
            point_id,
            ..
        } = self.nodes[node.0];

        if self.point_node[point_id.as_usize()] != Some(node) {
            // already removed
            return;
        }

        match (prev, next) {
            (Some(prev), Some(next)) => self.link(prev, next),
            (Some(prev), None) => self.nodes[prev.0].next = None,
            (None, Some(next)) => self.nodes[next.0].prev = None,
            (None, None) => {}
        }

        self.point_node[point_id.as_usize()] = None;
        self.len -= 1;

        if self.search_node == node {
            self.search_node = prev.or(next).unwrap_or(self.head);
        }
    }

    /// Locate the node whose front edge is above `x`, i.e. the last node with
    /// `node.x <= x`. Returns `None` when `x` is outside the front.
    pub fn locate_node(&mut self, x: f64) -> Option<NodeId> {
        let mut node = self.search_node;

        if x < self.point(node).x {
            while let Some(prev) = self.prev(node) {
                node = prev;
                if x >= self.point(node).x {
                    self.search_node = node;
                    return Some(node);
                }
            }
        } else {
            while let Some(next) = self.next(node) {
                if x < self.point(next).x {
                    self.search_node = node;
                    return Some(node);
                }
                node = next;
            }
        }

        None
    }

    /// Locate the front node of `point_id`
    pub fn locate_point(&self, point_id: PointId) -> Option<NodeId> {
        self.point_node.get(point_id.as_usize()).copied().flatten()
    }

    /// iterate nodes from head to tail
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        let mut current = Some(self.head);
        std::iter::from_fn(move || {
            let id = current?;
            let node = &self.nodes[id.0];
            current = node.next;
            Some((id, node))
        })
    }
}
