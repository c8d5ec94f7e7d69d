use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::{shape::Point, PointId};

/// Collects points, merging duplicates by value.
#[derive(Debug, Clone, Default)]
pub struct PointsBuilder {
    points: Vec<Point>,
    index: FxHashMap<(u64, u64), usize>,
}

impl PointsBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Add a point, returns the builder index. A point equal to an already
    /// added one gets the existing index.
    pub fn add_point(&mut self, point: Point) -> usize {
        let next = self.points.len();
        let idx = *self.index.entry(point.key()).or_insert(next);
        if idx == next {
            self.points.push(point);
        }
        idx
    }

    /// Sort points into sweep order and append the two sentinel points.
    /// Returns the store and a map from builder index to [`PointId`].
    pub fn build(self) -> (Points, Vec<PointId>) {
        let mut order = (0..self.points.len()).collect::<Vec<_>>();
        order.sort_by(|a, b| sweep_cmp(&self.points[*a], &self.points[*b]));

        let mut remap = vec![PointId(0); self.points.len()];
        let mut points = Vec::with_capacity(self.points.len() + 2);
        for (new_idx, old_idx) in order.into_iter().enumerate() {
            remap[old_idx] = PointId(new_idx);
            points.push(self.points[old_idx]);
        }

        (Points::new(points), remap)
    }
}

/// Sweep order, by y then by x
pub fn sweep_cmp(a: &Point, b: &Point) -> Ordering {
    a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x))
}

/// Margin of the sentinel points, relative to the bounding box size
const ALPHA: f64 = 0.3;

/// Point store, provide a unique [`PointId`]
/// Points are kept in sweep order, the two sentinel points are stored last.
#[derive(Debug, Clone)]
pub struct Points {
    points: Vec<Point>,
    /// left sentinel, below and left of every point
    pub head: PointId,
    /// right sentinel, below and right of every point
    pub tail: PointId,
}

impl Points {
    /// Create the store from points already in sweep order.
    pub fn new(mut points: Vec<Point>) -> Self {
        debug_assert!(points.windows(2).all(|w| sweep_cmp(&w[0], &w[1]).is_lt()));

        let mut xmin = f64::MAX;
        let mut xmax = f64::MIN;
        let mut ymin = f64::MAX;
        let mut ymax = f64::MIN;
        for p in &points {
            xmin = xmin.min(p.x);
            xmax = xmax.max(p.x);
            ymin = ymin.min(p.y);
            ymax = ymax.max(p.y);
        }
        if points.is_empty() {
            (xmin, xmax, ymin, ymax) = (0., 0., 0., 0.);
        }

        // the larger side sets the margin, a flat bounding box still keeps
        // the sentinels apart at any scale
        let span = (xmax - xmin).max(ymax - ymin);
        let margin = ALPHA * if span > 0. { span } else { 1. };

        let head = PointId(points.len());
        points.push(Point::new(xmin - margin, ymin - margin));
        let tail = PointId(points.len());
        points.push(Point::new(xmax + margin, ymin - margin));

        Self { points, head, tail }
    }

    /// number of points, sentinels included
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// number of real points
    pub fn real_len(&self) -> usize {
        self.points.len() - 2
    }

    /// Get the point, panics on an id not produced by this store
    pub fn get(&self, point_id: PointId) -> Point {
        self.points[point_id.0]
    }

    pub fn is_sentinel(&self, point_id: PointId) -> bool {
        point_id == self.head || point_id == self.tail
    }

    /// The lowest real point, it seeds the first triangle
    pub fn first_id(&self) -> PointId {
        PointId(0)
    }

    /// iterate real points in sweep order, skipping the first `skip`
    pub fn iter_point_by_y(&self, skip: usize) -> impl Iterator<Item = (PointId, Point)> + '_ {
        self.points[..self.real_len()]
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(idx, p)| (PointId(idx), *p))
    }

    /// real points, in sweep order
    pub fn as_slice(&self) -> &[Point] {
        &self.points[..self.real_len()]
    }
}
