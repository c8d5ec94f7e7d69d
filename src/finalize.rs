use crate::{Context, Sweeper, TriangleId};

impl Sweeper {
    /// Collect the interior triangles into `context.result`.
    ///
    /// Triangles are flooded from the outside of the mesh, each constrained
    /// edge crossed adds one to the depth. Odd depth is inside the shape:
    /// depth 1 is the outline's interior, depth 2 a hole, and so on.
    pub(crate) fn finalize_polygon(context: &mut Context) {
        let len = context.triangles.len();
        let mut depth: Vec<Option<u32>> = vec![None; len];

        // triangles on the hull of the mesh start the flood, those behind a
        // constrained hull edge are already inside
        let mut current = Vec::new();
        let mut deeper = Vec::new();
        for (id, triangle) in context.triangles.iter() {
            for i in 0..3 {
                if triangle.neighbors[i].invalid() {
                    if triangle.constrained_edge[i] {
                        deeper.push(id);
                    } else {
                        current.push(id);
                    }
                }
            }
        }

        let mut level = 0;
        while !current.is_empty() || !deeper.is_empty() {
            while let Some(id) = current.pop() {
                let slot = &mut depth[id.as_usize()];
                if slot.is_some() {
                    continue;
                }
                *slot = Some(level);

                let triangle = context.triangles.get_unchecked(id);
                for i in 0..3 {
                    let neighbor = triangle.neighbors[i];
                    if neighbor.invalid() || depth[neighbor.as_usize()].is_some() {
                        continue;
                    }
                    if triangle.constrained_edge[i] {
                        deeper.push(neighbor);
                    } else {
                        current.push(neighbor);
                    }
                }
            }

            std::mem::swap(&mut current, &mut deeper);
            level += 1;
        }

        context.result.clear();
        for idx in 0..len {
            let interior = matches!(depth[idx], Some(d) if d % 2 == 1);
            let id = TriangleId::from_usize(idx);
            context.triangles.get_mut_unchecked(id).interior = interior;
            if interior {
                context.result.push(id);
            }
        }

        tracing::trace!(
            interior = context.result.len(),
            levels = level,
            "polygon finalized"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::{Point, SweeperBuilder};

    #[test]
    fn test_hole_is_outside() {
        let outline = vec![
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(10., 10.),
            Point::new(0., 10.),
        ];
        let hole = vec![
            Point::new(2., 2.),
            Point::new(2., 8.),
            Point::new(8., 8.),
            Point::new(8., 2.),
        ];

        let triangulation = SweeperBuilder::new(outline)
            .add_hole(hole)
            .build()
            .unwrap()
            .triangulate()
            .unwrap();

        assert_eq!(triangulation.len(), 8);
        assert!((triangulation.area() - 64.).abs() < 1e-9);
    }
}
