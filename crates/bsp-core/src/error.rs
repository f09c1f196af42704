//! Error types for pool mutation and tree construction.

use thiserror::Error;

/// Errors raised by the pooled arenas.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// An arena reached the 16-bit index cap.
    #[error("pool capacity exhausted ({limit} entries)")]
    Exhausted { limit: usize },

    /// A face or insertion position lies outside the face pool.
    #[error("position {pos} is outside the face pool")]
    PositionOutOfRange { pos: u16 },

    /// A face references a vertex index the vertex pool does not hold.
    #[error("face {face} references vertex {vertex} outside the vertex pool")]
    VertexOutOfRange { face: u16, vertex: u16 },

    /// A face whose vertices do not span a plane.
    #[error("face does not span a plane")]
    DegenerateFace,

    /// An operation that requires populated pools found them empty.
    #[error("vertex or face pool is empty")]
    Empty,
}

/// Errors raised while partitioning and clipping.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A clip edge ran parallel to the clipping plane. Classification should
    /// rule this out; seeing it means the mesh is at the epsilon boundary.
    #[error("segment does not cross the clipping plane")]
    ParallelSegment,

    /// A triangle inside the pivot band was handed to the clipper.
    #[error("face {face} lies inside the pivot band [{pl}, {pr}]")]
    PivotClipped { face: u16, pl: u16, pr: u16 },
}
