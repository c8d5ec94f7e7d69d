use crate::PointId;

#[derive(Debug, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TriangleId(usize);

impl TriangleId {
    pub const INVALID: TriangleId = TriangleId(usize::MAX);

    /// whether id is invalid
    pub fn invalid(&self) -> bool {
        self.0 == Self::INVALID.0
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }

    pub(crate) fn from_usize(idx: usize) -> Self {
        Self(idx)
    }
}

/// Triangle in the arena. Points are stored counter clockwise, edge `i` is
/// the edge opposite to `points[i]`, and so are `neighbors[i]` and the flags.
#[derive(Debug, Clone, Copy)]
pub struct InnerTriangle {
    /// triangle points
    pub points: [PointId; 3],

    /// flags to determine if an edge is a Constrained edge
    pub constrained_edge: [bool; 3],

    /// flags to determine if an edge is a Delauney edge, only valid during
    /// one legalization
    pub delaunay_edge: [bool; 3],

    /// neighbors
    pub neighbors: [TriangleId; 3],

    /// Has this triangle been marked as an interior triangle?
    pub interior: bool,
}

impl InnerTriangle {
    pub fn new(a: PointId, b: PointId, c: PointId) -> Self {
        Self {
            points: [a, b, c],
            constrained_edge: [false; 3],
            delaunay_edge: [false; 3],
            neighbors: [TriangleId::INVALID; 3],
            interior: false,
        }
    }

    /// whether contains the point
    pub fn contains(&self, point_id: PointId) -> bool {
        self.points.contains(&point_id)
    }

    pub fn contains_pair(&self, p: PointId, q: PointId) -> bool {
        self.contains(p) && self.contains(q)
    }

    /// get point index
    pub fn point_index(&self, point: PointId) -> Option<usize> {
        self.points.iter().position(|p| *p == point)
    }

    fn index_of(&self, point: PointId) -> usize {
        match self.point_index(point) {
            Some(idx) => idx,
            None => panic!("point {point:?} not belongs to triangle {self:?}"),
        }
    }

    /// The point clockwise to given point
    pub fn point_cw(&self, point: PointId) -> PointId {
        self.points[(self.index_of(point) + 2) % 3]
    }

    /// The point counter-clockwise to given point
    pub fn point_ccw(&self, point: PointId) -> PointId {
        self.points[(self.index_of(point) + 1) % 3]
    }

    /// The opposite point for point in neighbor `from_triangle`
    pub fn opposite_point(&self, from_triangle: &InnerTriangle, point: PointId) -> PointId {
        let cw = from_triangle.point_cw(point);
        self.point_cw(cw)
    }

    /// index of the edge between `p` and `q`
    pub fn edge_index(&self, p: PointId, q: PointId) -> Option<usize> {
        let p_index = self.point_index(p)?;
        let q_index = self.point_index(q)?;

        match (p_index, q_index) {
            (0, 1) | (1, 0) => Some(2),
            (1, 2) | (2, 1) => Some(0),
            (0, 2) | (2, 0) => Some(1),
            _ => None,
        }
    }

    /// neighbor counter clockwise to given point
    pub fn neighbor_ccw(&self, p: PointId) -> TriangleId {
        self.neighbors[(self.index_of(p) + 2) % 3]
    }

    /// neighbor clockwise to given point
    pub fn neighbor_cw(&self, p: PointId) -> TriangleId {
        self.neighbors[(self.index_of(p) + 1) % 3]
    }

    /// neighbor across the edge opposite to given point
    pub fn neighbor_across(&self, p: PointId) -> TriangleId {
        self.neighbors[self.index_of(p)]
    }

    /// constrained edge flag for edge `ccw` to given point
    pub fn constrained_edge_ccw(&self, p: PointId) -> bool {
        self.constrained_edge[(self.index_of(p) + 2) % 3]
    }

    /// constrained edge flag for edge `cw` to given point
    pub fn constrained_edge_cw(&self, p: PointId) -> bool {
        self.constrained_edge[(self.index_of(p) + 1) % 3]
    }

    pub fn set_constrained_edge_ccw(&mut self, p: PointId, val: bool) {
        let idx = (self.index_of(p) + 2) % 3;
        self.constrained_edge[idx] = val;
    }

    pub fn set_constrained_edge_cw(&mut self, p: PointId, val: bool) {
        let idx = (self.index_of(p) + 1) % 3;
        self.constrained_edge[idx] = val;
    }

    /// set constrained flag for edge identified by `p` and `q`
    pub fn set_constrained_for_edge(&mut self, p: PointId, q: PointId) {
        if let Some(index) = self.edge_index(p, q) {
            self.constrained_edge[index] = true;
        }
    }

    /// delaunay edge flag for edge `ccw` to given point
    pub fn delaunay_edge_ccw(&self, p: PointId) -> bool {
        self.delaunay_edge[(self.index_of(p) + 2) % 3]
    }

    /// delaunay edge flag for edge `cw` to given point
    pub fn delaunay_edge_cw(&self, p: PointId) -> bool {
        self.delaunay_edge[(self.index_of(p) + 1) % 3]
    }

    pub fn set_delaunay_edge_ccw(&mut self, p: PointId, val: bool) {
        let idx = (self.index_of(p) + 2) % 3;
        self.delaunay_edge[idx] = val;
    }

    pub fn set_delaunay_edge_cw(&mut self, p: PointId, val: bool) {
        let idx = (self.index_of(p) + 1) % 3;
        self.delaunay_edge[idx] = val;
    }

    pub fn clear_delaunay_edges(&mut self) {
        self.delaunay_edge = [false; 3];
    }

    pub fn clear_neighbors(&mut self) {
        self.neighbors = [TriangleId::INVALID; 3];
    }

    /// Rotate the triangle clockwise around `old_point`, replacing the
    /// point ccw to it with `new_point`. Used by edge flips.
    pub fn rotate(&mut self, old_point: PointId, new_point: PointId) {
        match self.index_of(old_point) {
            0 => {
                self.points[1] = self.points[0];
                self.points[0] = self.points[2];
                self.points[2] = new_point;
            }
            1 => {
                self.points[2] = self.points[1];
                self.points[1] = self.points[0];
                self.points[0] = new_point;
            }
            _ => {
                self.points[0] = self.points[2];
                self.points[2] = self.points[1];
                self.points[1] = new_point;
            }
        }
    }
}

/// Triangle store, store triangles and their neighborhood relations
// Note: For n vetexes, there will around 2n triangles (sentinels included),
//       so space complexity is O(n).
#[derive(Debug, Clone, Default)]
pub struct Triangles {
    triangles: Vec<InnerTriangle>,
}

impl Triangles {
    pub fn new() -> Self {
        Self { triangles: vec![] }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    /// insert a new triangle
    pub fn insert(&mut self, triangle: InnerTriangle) -> TriangleId {
        let id = TriangleId(self.triangles.len());
        self.triangles.push(triangle);
        id
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn get(&self, id: TriangleId) -> Option<&InnerTriangle> {
        self.triangles.get(id.0)
    }

    /// panics on an invalid id
    pub fn get_unchecked(&self, id: TriangleId) -> &InnerTriangle {
        &self.triangles[id.0]
    }

    pub fn get_mut(&mut self, id: TriangleId) -> Option<&mut InnerTriangle> {
        self.triangles.get_mut(id.0)
    }

    /// panics on an invalid id
    pub fn get_mut_unchecked(&mut self, id: TriangleId) -> &mut InnerTriangle {
        &mut self.triangles[id.0]
    }

    fn get_mut_two(
        &mut self,
        id_0: TriangleId,
        id_1: TriangleId,
    ) -> (&mut InnerTriangle, &mut InnerTriangle) {
        assert!(id_0 != id_1, "two distinct triangles are required");

        if id_0.0 < id_1.0 {
            let (left, right) = self.triangles.split_at_mut(id_1.0);
            (&mut left[id_0.0], &mut right[0])
        } else {
            let (left, right) = self.triangles.split_at_mut(id_0.0);
            (&mut right[0], &mut left[id_1.0])
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TriangleId, &InnerTriangle)> {
        self.triangles
            .iter()
            .enumerate()
            .map(|(idx, t)| (TriangleId(idx), t))
    }

    /// mark two triangle as neighbor, returns false when they share no edge
    pub fn mark_neighbor(&mut self, left: TriangleId, right: TriangleId) -> bool {
        let (left_triangle, right_triangle) = self.get_mut_two(left, right);

        let (l_ei, r_ei) = if let Some(r_ei) =
            right_triangle.edge_index(left_triangle.points[1], left_triangle.points[2])
        {
            (0, r_ei)
        } else if let Some(r_ei) =
            right_triangle.edge_index(left_triangle.points[0], left_triangle.points[2])
        {
            (1, r_ei)
        } else if let Some(r_ei) =
            right_triangle.edge_index(left_triangle.points[0], left_triangle.points[1])
        {
            (2, r_ei)
        } else {
            return false;
        };

        let is_constrained_edge =
            left_triangle.constrained_edge[l_ei] || right_triangle.constrained_edge[r_ei];

        left_triangle.neighbors[l_ei] = right;
        left_triangle.constrained_edge[l_ei] = is_constrained_edge;

        right_triangle.neighbors[r_ei] = left;
        right_triangle.constrained_edge[r_ei] = is_constrained_edge;

        true
    }

    /// Mark the edge `p`-`q` constrained in `triangle_id` and in the neighbor
    /// across that edge.
    pub fn mark_constrained(&mut self, triangle_id: TriangleId, p: PointId, q: PointId) {
        let triangle = self.get_mut_unchecked(triangle_id);
        let Some(idx) = triangle.edge_index(p, q) else {
            return;
        };
        triangle.constrained_edge[idx] = true;
        let neighbor = triangle.neighbors[idx];
        if let Some(neighbor) = self.get_mut(neighbor) {
            neighbor.set_constrained_for_edge(p, q);
        }
    }

    /// Flip the edge shared by `t` and `ot`, where `p` is the point of `t`
    /// opposite the shared edge and `op` the one of `ot`. After the flip the
    /// shared edge is `p`-`op`; flags and neighbors of the four outer edges
    /// are carried over.
    pub fn rotate_triangle_pair(
        &mut self,
        triangle_id: TriangleId,
        p: PointId,
        ot_id: TriangleId,
        op: PointId,
    ) {
        let t = *self.get_unchecked(triangle_id);
        let ot = *self.get_unchecked(ot_id);

        let n1 = t.neighbor_ccw(p);
        let n2 = t.neighbor_cw(p);
        let n3 = ot.neighbor_ccw(op);
        let n4 = ot.neighbor_cw(op);

        let ce1 = t.constrained_edge_ccw(p);
        let ce2 = t.constrained_edge_cw(p);
        let ce3 = ot.constrained_edge_ccw(op);
        let ce4 = ot.constrained_edge_cw(op);

        let de1 = t.delaunay_edge_ccw(p);
        let de2 = t.delaunay_edge_cw(p);
        let de3 = ot.delaunay_edge_ccw(op);
        let de4 = ot.delaunay_edge_cw(op);

        let (t, ot) = self.get_mut_two(triangle_id, ot_id);
        t.rotate(p, op);
        ot.rotate(op, p);

        ot.set_delaunay_edge_ccw(p, de1);
        t.set_delaunay_edge_cw(p, de2);
        t.set_delaunay_edge_ccw(op, de3);
        ot.set_delaunay_edge_cw(op, de4);

        ot.set_constrained_edge_ccw(p, ce1);
        t.set_constrained_edge_cw(p, ce2);
        t.set_constrained_edge_ccw(op, ce3);
        ot.set_constrained_edge_cw(op, ce4);

        t.clear_neighbors();
        ot.clear_neighbors();

        if !n1.invalid() {
            self.mark_neighbor(ot_id, n1);
        }
        if !n2.invalid() {
            self.mark_neighbor(triangle_id, n2);
        }
        if !n3.invalid() {
            self.mark_neighbor(triangle_id, n3);
        }
        if !n4.invalid() {
            self.mark_neighbor(ot_id, n4);
        }

        self.mark_neighbor(triangle_id, ot_id);
    }
}

#[cfg(test)]
mod tests {
    use crate::PointId;

    use super::*;

    #[test]
    fn test_rotate() {
        //
        //      1                1
        //     /  \              | \
        //   2  -  3   =>   2    |  3
        //                       | /
        //       4               4
        //
        let mut t = InnerTriangle::new(PointId(1), PointId(2), PointId(3));
        t.rotate(PointId(1), PointId(4));
        assert_eq!(t.points, [PointId(3), PointId(1), PointId(4)]);

        let mut t = InnerTriangle::new(PointId(1), PointId(2), PointId(3));
        t.rotate(PointId(3), PointId(4));
        assert_eq!(t.points, [PointId(3), PointId(4), PointId(2)]);

        let mut t = InnerTriangle::new(PointId(1), PointId(2), PointId(3));
        t.rotate(PointId(2), PointId(4));
        assert_eq!(t.points, [PointId(4), PointId(1), PointId(2)]);
    }

    #[test]
    fn test_point_and_neighbor_lookup() {
        let mut t = InnerTriangle::new(PointId(0), PointId(1), PointId(2));
        t.neighbors = [TriangleId(10), TriangleId(11), TriangleId(12)];

        assert_eq!(t.point_ccw(PointId(0)), PointId(1));
        assert_eq!(t.point_cw(PointId(0)), PointId(2));
        assert_eq!(t.point_ccw(PointId(2)), PointId(0));

        // the edge ccw to point 0 is the edge 0-1, opposite point 2
        assert_eq!(t.neighbor_ccw(PointId(0)), TriangleId(12));
        assert_eq!(t.neighbor_cw(PointId(0)), TriangleId(11));
        assert_eq!(t.neighbor_across(PointId(0)), TriangleId(10));

        assert_eq!(t.edge_index(PointId(2), PointId(0)), Some(1));
        assert_eq!(t.edge_index(PointId(2), PointId(5)), None);
    }

    #[test]
    fn test_triangles() {
        let mut triangles = Triangles::new();

        let p0 = PointId(0);
        let p1 = PointId(1);
        let p2 = PointId(2);
        let p3 = PointId(3);

        let t1 = triangles.insert(InnerTriangle::new(p0, p1, p2));
        let t2 = triangles.insert(InnerTriangle::new(p1, p3, p2));

        assert!(triangles.mark_neighbor(t1, t2));
        {
            let t = triangles.get(t1).unwrap();
            assert_eq!(t.neighbors[0], t2);
            let t = triangles.get(t2).unwrap();
            assert_eq!(t.neighbors[1], t1);
        }

        triangles.mark_constrained(t1, p2, p1);
        assert!(triangles.get(t1).unwrap().constrained_edge[0]);
        assert!(triangles.get(t2).unwrap().constrained_edge[1]);

        let t3 = triangles.insert(InnerTriangle::new(PointId(5), PointId(6), PointId(7)));
        assert!(!triangles.mark_neighbor(t1, t3));
    }

    #[test]
    fn test_rotate_triangle_pair() {
        //  p(0)      ot: 1 3 2
        //  /  \      t: 0 1 2
        // 1 -- 2
        //  \  /
        //   3
        let mut triangles = Triangles::new();
        let t = triangles.insert(InnerTriangle::new(PointId(0), PointId(1), PointId(2)));
        let ot = triangles.insert(InnerTriangle::new(PointId(1), PointId(3), PointId(2)));
        triangles.mark_neighbor(t, ot);

        triangles.rotate_triangle_pair(t, PointId(0), ot, PointId(3));

        let t = *triangles.get(t).unwrap();
        let ot_tri = *triangles.get(ot).unwrap();
        assert!(t.contains_pair(PointId(0), PointId(3)));
        assert!(ot_tri.contains_pair(PointId(0), PointId(3)));
        assert!(!t.contains_pair(PointId(1), PointId(2)));
        assert_eq!(t.neighbors[t.edge_index(PointId(0), PointId(3)).unwrap()], ot);
    }

    #[test]
    fn test_get_mut_two() {
        let mut triangles = Triangles::new();
        let t1 = triangles.insert(InnerTriangle::new(PointId(0), PointId(1), PointId(2)));
        let t2 = triangles.insert(InnerTriangle::new(PointId(1), PointId(3), PointId(2)));

        let (a, b) = triangles.get_mut_two(t2, t1);
        assert_eq!(a.points[1], PointId(3));
        assert_eq!(b.points[1], PointId(1));
    }
}
