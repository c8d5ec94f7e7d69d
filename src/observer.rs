use crate::{Context, Edge, PointId, TriangleId};

/// Hooks into the sweep, all no-op by default. Useful to dump or draw the
/// intermediate state while debugging.
pub trait Observer {
    /// A point event is done
    fn point_event(&mut self, _point_id: PointId, _context: &Context) {}

    /// An edge event is done
    fn edge_event(&mut self, _edge: Edge, _context: &Context) {}

    /// A legalization starting at `triangle_id` is about to run
    fn will_legalize(&mut self, _triangle_id: TriangleId, _context: &Context) {}

    /// One flip of a legalization, `triangle_id` is the flipped triangle
    fn legalize_step(&mut self, _triangle_id: TriangleId, _context: &Context) {}

    /// The legalization starting at `triangle_id` is done
    fn legalized(&mut self, _triangle_id: TriangleId, _context: &Context) {}

    /// All point and edge events are done
    fn sweep_done(&mut self, _context: &Context) {}

    /// Interior triangles are collected into `context.result`
    fn finalized(&mut self, _context: &Context) {}
}

impl Observer for () {}
