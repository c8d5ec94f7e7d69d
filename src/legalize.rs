use crate::{
    errors::ConstraintError, utils::in_circle, Context, Error, Observer, Points, Sweeper,
    TriangleId, Triangles,
};

/// Legalization related methods
impl Sweeper {
    /// Restore the delaunay property around `triangle_id` by flipping edges.
    pub(crate) fn legalize(
        triangle_id: TriangleId,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        observer.will_legalize(triangle_id, context);
        Self::legalize_from(std::iter::once(triangle_id), context, observer)?;
        observer.legalized(triangle_id, context);
        Ok(())
    }

    /// Legalize starting from all of `start`, returns the number of flips.
    ///
    /// Runs as a worklist: a flipped pair pushes both triangles back, the
    /// new shared edge is flagged delaunay so it is not checked again in
    /// this run. Flags are cleared and touched triangles mapped to the
    /// front once the worklist drains.
    pub(crate) fn legalize_from(
        start: impl IntoIterator<Item = TriangleId>,
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<usize, Error> {
        let limit = context.config.flip_limit_for(context.triangles.len());

        let mut task_queue = std::mem::take(&mut context.legalize_task_queue);
        let mut touched = std::mem::take(&mut context.legalize_touched);
        task_queue.clear();
        touched.clear();
        task_queue.extend(start);
        touched.extend_from_slice(&task_queue);

        let mut flips = 0;
        let mut result: Result<(), Error> = Ok(());
        while let Some(triangle_id) = task_queue.pop() {
            let Some(ot_id) =
                Self::flip_illegal_edge(triangle_id, &mut context.triangles, context.points)
            else {
                continue;
            };

            flips += 1;
            touched.push(ot_id);
            if flips > limit {
                result = Err(ConstraintError::FlipLimit(limit).into());
                break;
            }
            observer.legalize_step(triangle_id, context);

            // We now got one valid Delaunay Edge shared by two triangles
            // This gives us 4 new edges to check for Delaunay
            task_queue.push(ot_id);
            task_queue.push(triangle_id);
        }

        for triangle_id in touched.iter() {
            context
                .triangles
                .get_mut_unchecked(*triangle_id)
                .clear_delaunay_edges();
            context.map_triangle_to_nodes(*triangle_id);
        }

        context.legalize_task_queue = task_queue;
        context.legalize_touched = touched;

        result.map(|_| flips)
    }

    /// Flip the first edge of the triangle that violates the delaunay
    /// condition. Returns the triangle it was flipped with.
    fn flip_illegal_edge(
        triangle_id: TriangleId,
        triangles: &mut Triangles,
        points: &Points,
    ) -> Option<TriangleId> {
        for i in 0..3 {
            let triangle = *triangles.get_unchecked(triangle_id);
            if triangle.delaunay_edge[i] {
                continue;
            }

            let ot_id = triangle.neighbors[i];
            let Some(ot) = triangles.get(ot_id) else {
                continue;
            };

            let p = triangle.points[i];
            let op = ot.opposite_point(&triangle, p);
            let Some(oi) = ot.point_index(op) else {
                continue;
            };

            // if this is a constrained edge or a delaunay edge(only during
            // this legalization) then we should not try to legalize
            if ot.constrained_edge[oi] || ot.delaunay_edge[oi] {
                let constrained = ot.constrained_edge[oi];
                triangles.get_mut_unchecked(triangle_id).constrained_edge[i] = constrained;
                continue;
            }

            let inside = in_circle(
                points.get(p),
                points.get(triangle.point_ccw(p)),
                points.get(triangle.point_cw(p)),
                points.get(op),
            );

            if inside {
                // first mark this shared edge as delaunay
                triangles.get_mut_unchecked(triangle_id).delaunay_edge[i] = true;
                triangles.get_mut_unchecked(ot_id).delaunay_edge[oi] = true;

                // rotate shared edge one vertex cw to legalize it
                triangles.rotate_triangle_pair(triangle_id, p, ot_id, op);
                return Some(ot_id);
            }
        }

        None
    }

    /// Flip until no edge between two triangles violates the delaunay
    /// condition. Fails when the configured rounds leave an illegal edge.
    pub(crate) fn legalize_all(
        context: &mut Context,
        observer: &mut impl Observer,
    ) -> Result<(), Error> {
        let rounds = context.config.refine_rounds;
        for round in 0..rounds {
            let all = (0..context.triangles.len())
                .map(TriangleId::from_usize)
                .collect::<Vec<_>>();
            let flips = Self::legalize_from(all, context, observer)?;
            tracing::trace!(round, flips, "legalize pass");
            if flips == 0 {
                return Ok(());
            }
        }

        let all = (0..context.triangles.len()).map(TriangleId::from_usize);
        let illegal = Self::illegal_pairs(context, all, false).len();
        if illegal == 0 {
            return Ok(());
        }

        tracing::warn!(rounds, illegal, "delaunay refinement did not settle");
        Err(ConstraintError::RefineLimit(rounds).into())
    }

    /// Pairs of neighboring result triangles violating the delaunay
    /// condition across a non constrained edge.
    pub fn illegal_triangles(context: &Context) -> Vec<(TriangleId, TriangleId)> {
        Self::illegal_pairs(context, context.result.iter().copied(), true)
    }

    fn illegal_pairs(
        context: &Context,
        triangle_ids: impl Iterator<Item = TriangleId>,
        interior_only: bool,
    ) -> Vec<(TriangleId, TriangleId)> {
        let mut result = Vec::new();

        for triangle_id in triangle_ids {
            let triangle = context.triangles.get_unchecked(triangle_id);
            for i in 0..3 {
                if triangle.constrained_edge[i] {
                    continue;
                }
                let ot_id = triangle.neighbors[i];
                let Some(ot) = context.triangles.get(ot_id) else {
                    continue;
                };
                if interior_only && !ot.interior {
                    continue;
                }

                let p = triangle.points[i];
                let op = ot.opposite_point(triangle, p);
                if ot.point_index(op).is_some_and(|oi| ot.constrained_edge[oi]) {
                    continue;
                }
                if in_circle(
                    context.points.get(p),
                    context.points.get(triangle.point_ccw(p)),
                    context.points.get(triangle.point_cw(p)),
                    context.points.get(op),
                ) {
                    result.push((triangle_id, ot_id));
                }
            }
        }

        result
    }
}
