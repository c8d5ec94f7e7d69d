/// Tuning for one triangulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Check the input for intersecting edges, holes outside the outline and
    /// steiner points outside the shape before sweeping.
    pub validate: bool,

    /// Max flips in one legalization. `None` uses `3 * triangles + 16`,
    /// which a terminating legalization never reaches.
    pub legalize_flip_limit: Option<usize>,

    /// Max steps of one edge event. `None` uses `64 * (triangles + 64)`.
    pub edge_event_step_limit: Option<usize>,

    /// Passes of the delaunay refinement run after the sweep. An edge still
    /// illegal after the last pass fails the triangulation.
    pub refine_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validate: true,
            legalize_flip_limit: None,
            edge_event_step_limit: None,
            refine_rounds: 8,
        }
    }
}

impl Config {
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn legalize_flip_limit(mut self, limit: usize) -> Self {
        self.legalize_flip_limit = Some(limit);
        self
    }

    pub fn edge_event_step_limit(mut self, limit: usize) -> Self {
        self.edge_event_step_limit = Some(limit);
        self
    }

    pub fn refine_rounds(mut self, rounds: usize) -> Self {
        self.refine_rounds = rounds;
        self
    }

    pub(crate) fn flip_limit_for(&self, triangles: usize) -> usize {
        self.legalize_flip_limit
            .unwrap_or_else(|| 3usize.saturating_mul(triangles).saturating_add(16))
    }

    pub(crate) fn step_limit_for(&self, triangles: usize) -> usize {
        self.edge_event_step_limit
            .unwrap_or_else(|| 64usize.saturating_mul(triangles.saturating_add(64)))
    }
}
