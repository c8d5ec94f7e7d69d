//! Constrained Delaunay triangulation of polygons with holes and steiner
//! points, using a sweep line over an advancing front.
//!
//! ```rust
//! use sweep_cdt::Shape;
//!
//! let mut shape = Shape::from_coords(&[[0., 0.], [4., 0.], [4., 4.], [0., 4.]]);
//! shape.add_hole(Shape::from_coords(&[[1., 1.], [3., 1.], [3., 3.], [1., 3.]]));
//!
//! let triangulation = shape.triangulate().unwrap();
//! assert!((triangulation.area() - 12.).abs() < 1e-9);
//! ```

mod advancing_front;
mod config;
mod context;
mod edge;
mod edge_event;
mod errors;
mod finalize;
mod legalize;
mod observer;
mod points;
mod shape;
mod sweeper;
mod triangles;
mod triangulation;
pub mod utils;
mod validate;

pub use advancing_front::{AdvancingFront, Node, NodeId};
pub use config::Config;
pub use context::Context;
pub use edge::Edges;
pub use errors::{ConstraintError, Error, InputError};
pub use observer::Observer;
pub use points::Points;
pub use shape::{Edge, Point, Rect, Shape};
pub use sweeper::{Sweeper, SweeperBuilder};
pub use triangles::{InnerTriangle, TriangleId, Triangles};
pub use triangulation::Triangulation;

/// new type for point id, the index of the point in [`Points`]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct PointId(pub(crate) usize);

impl PointId {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}
