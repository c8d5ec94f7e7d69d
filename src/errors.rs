use thiserror::Error;

use crate::PointId;

/// Malformed input, reported before the sweep starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("a shape needs at least 3 distinct, non collinear points, got {0}")]
    TooFewPoints(usize),

    #[error("point ({x}, {y}) is not finite")]
    NonFinite { x: f64, y: f64 },

    #[error("edge ({a_x}, {a_y})-({b_x}, {b_y}) intersects another boundary or hole edge")]
    SelfIntersecting {
        a_x: f64,
        a_y: f64,
        b_x: f64,
        b_y: f64,
    },

    #[error("hole {0} is not contained in the outer boundary")]
    HoleNotContained(usize),

    #[error("steiner point ({x}, {y}) is not inside the shape")]
    SteinerOutside { x: f64, y: f64 },
}

/// An edge event could not realize its constrained edge
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("edge event {p:?}-{q:?} did not complete within {limit} steps")]
    NonTermination { p: PointId, q: PointId, limit: usize },

    #[error("legalization exceeded the limit of {0} flips")]
    FlipLimit(usize),

    #[error("delaunay refinement did not settle within {0} rounds")]
    RefineLimit(usize),

    #[error("edge event {p:?}-{q:?} crosses another constrained edge")]
    CrossesConstraint { p: PointId, q: PointId },

    #[error("point {0:?} is collinear with a constrained edge it is not part of")]
    CollinearUnsupported(PointId),

    #[error("no neighbor triangle while walking edge {p:?}-{q:?}")]
    MissingNeighbor { p: PointId, q: PointId },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("constraint violation: {0}")]
    Constraint(#[from] ConstraintError),

    /// the advancing front became inconsistent, usually from nearly
    /// degenerate input
    #[error("geometric degeneracy: {0}")]
    Degeneracy(&'static str),
}
