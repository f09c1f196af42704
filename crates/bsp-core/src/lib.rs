//! BSP (Binary Space Partitioning) tree construction over pooled triangle
//! meshes.
//!
//! The crate partitions a triangle soup in place: faces are reordered,
//! clipped, and tagged inside growable index-addressed pools, and the
//! resulting tree nodes reference contiguous bands of the face array rather
//! than owning geometry. This keeps the final face order meaningful: an
//! in-order traversal of the tree walks the pool left to right.
//!
//! # Construction
//!
//! ```ignore
//! use bsp_core::{BspTree, Face, Pools};
//! use nalgebra::Point3;
//!
//! let mut pools = Pools::from_mesh(verts, faces)?;
//! pools.check();
//! pools.make_planes()?;
//! let tree = BspTree::build(&mut pools);
//! ```
//!
//! # Architecture
//!
//! - [`Pools`]: synchronized vertex / face / plane arenas
//! - [`Plane`]: Hessian-normal-form planes with a transient [`Relation`] tag
//! - [`BspTree`]: the builder and the indexed node arena
//! - [`BspNode`]: parent/child links plus the coplanar face band `[pl, pr]`

mod error;
mod face;
mod plane;
mod pools;

mod bsp;

pub use bsp::{BspNode, BspTree, BuildStats};
pub use error::{BuildError, PoolError};
pub use face::Face;
pub use plane::{PLANE_EPSILON, Plane, PlaneSide, Relation};
pub use pools::{POOL_LIMIT, Pools};

/// Sentinel index meaning "no such entry".
///
/// Reserved in every arena; the pools and the node store are capped at
/// [`POOL_LIMIT`] entries so a live index can never collide with it.
pub const NIL: u16 = u16::MAX;
