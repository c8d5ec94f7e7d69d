use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};

use crate::{Edge, PointId};

/// Constrained edge storage. In this algorithm an edge is only needed when
/// its higher end point is swept, so each point just stores the `lower`
/// points of the edges ending at it.
#[derive(Debug, Clone)]
pub struct Edges {
    point_edges: Vec<SmallVec<[PointId; 2]>>,
    len: usize,
}

impl Edges {
    /// Create a new [`Edges`] from edges, duplicated edges are stored once
    pub fn new(edges: impl IntoIterator<Item = Edge>, point_size: usize) -> Self {
        let mut point_edges = vec![smallvec![]; point_size];
        let mut seen = FxHashSet::<Edge>::default();
        let mut len = 0;
        for edge in edges {
            if seen.insert(edge) {
                point_edges[edge.q.as_usize()].push(edge.p);
                len += 1;
            }
        }

        Self { point_edges, len }
    }

    /// Get all `lower point p` [`PointId`] slice for q
    pub fn p_for_q(&self, q: PointId) -> &[PointId] {
        self.point_edges
            .get(q.as_usize())
            .map(|edges| edges.as_slice())
            .unwrap_or_default()
    }

    /// number of distinct constrained edges
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Edge> + '_ {
        self.point_edges
            .iter()
            .enumerate()
            .flat_map(|(q, ps)| ps.iter().map(move |p| Edge { p: *p, q: PointId(q) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let edges = Edges::new(
            vec![
                Edge {
                    p: PointId(0),
                    q: PointId(1),
                },
                Edge {
                    p: PointId(1),
                    q: PointId(2),
                },
                Edge {
                    p: PointId(2),
                    q: PointId(3),
                },
                Edge {
                    p: PointId(0),
                    q: PointId(3),
                },
                Edge {
                    p: PointId(0),
                    q: PointId(3),
                },
            ],
            10,
        );

        assert_eq!(edges.len(), 4);
        assert_eq!(edges.p_for_q(PointId(0)).len(), 0);
        assert_eq!(edges.p_for_q(PointId(1)).len(), 1);
        assert_eq!(edges.p_for_q(PointId(2)).len(), 1);
        assert_eq!(edges.p_for_q(PointId(3)), &[PointId(2), PointId(0)]);
        assert_eq!(edges.iter().count(), 4);
        assert!(edges.p_for_q(PointId(42)).is_empty());
    }
}
