use crate::{utils::triangle_area, Context, Error, Point};

/// Result of a triangulation: the merged points and the interior triangles
/// indexing into them, all counter clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    points: Vec<Point>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Collect the interior triangles. One touching a sentinel means the
    /// flood leaked out of the outline and is reported, not dropped.
    pub(crate) fn new(context: &Context) -> Result<Self, Error> {
        let points = context.points.as_slice().to_vec();

        let triangles = context
            .result
            .iter()
            .map(|id| {
                let t = context.triangles.get_unchecked(*id).points;
                if t.iter().any(|p| context.points.is_sentinel(*p)) {
                    return Err(Error::Degeneracy("interior triangle touches a sentinel"));
                }
                Ok(t.map(|p| p.as_usize()))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { points, triangles })
    }

    /// Points of the triangulation in sweep order, duplicates merged.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn triangle_indices(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.triangles
            .iter()
            .map(|t| t.map(|idx| self.points[idx]))
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Summed area of all triangles
    pub fn area(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| triangle_area(a, b, c))
            .sum()
    }

    /// Three points per triangle, ready for an unindexed vertex buffer
    pub fn vertex_list(&self) -> Vec<Point> {
        self.triangles().flatten().collect()
    }

    /// Like [`Triangulation::vertex_list`], with every point mapped to
    /// `p * scale + offset`.
    pub fn vertex_list_transformed(&self, offset: Point, scale: f64) -> Vec<Point> {
        self.triangles()
            .flatten()
            .map(|p| Point::new(p.x * scale + offset.x, p.y * scale + offset.y))
            .collect()
    }
}
