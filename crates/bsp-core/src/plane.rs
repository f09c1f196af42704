//! Hessian-normal-form planes and the three-way face classifier.

use nalgebra::{Point3, Vector3};

use crate::face::Face;

/// Absolute tolerance for plane classification.
///
/// Signed distances within this band count as "on" the plane. The tolerance
/// is absolute single-precision epsilon, adequate for coordinates of order
/// 1–100 but not universally robust; it is exposed so callers can reason
/// about the boundary cases it admits.
pub const PLANE_EPSILON: f32 = f32::EPSILON;

/// Which side of a plane a single point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Negative half-space (signed distance ≤ -epsilon).
    Behind,
    /// Positive half-space (signed distance ≥ +epsilon).
    Ahead,
    /// Within epsilon of the plane.
    On,
}

/// Relation of a whole triangle to a plane.
///
/// `Left` is the negative half-space, `Right` the positive. A triangle with
/// vertices strictly on both sides is `Intersect`; one with all vertices
/// within epsilon is `Coincide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Relation {
    #[default]
    Left,
    Right,
    Intersect,
    Coincide,
}

/// A plane in Hessian normal form: unit normal `m` and offset `d`, with a
/// point `p` on the plane iff `m · p = d`.
///
/// Each plane carries a transient [`Relation`] tag written by the pivot
/// scorer; it records the owning face's relation to the most recently
/// surveyed candidate plane and has no geometric meaning of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f32>,
    offset: f32,
    rel: Relation,
}

impl Plane {
    /// Derives the supporting plane of a face.
    ///
    /// Edges and the cross product are evaluated in double precision; the
    /// squared magnitude is checked against `f64::EPSILON` before
    /// normalizing. Returns `None` for zero-area faces.
    ///
    /// Faces are wound clockwise-front-facing, so the edges are taken in
    /// index order `0, 2, 1`.
    pub fn from_face(face: &Face, verts: &[Point3<f32>]) -> Option<Self> {
        let [a, b, c] = face.corners(verts);
        let a = a.cast::<f64>();
        let e0 = c.cast::<f64>() - a;
        let e1 = b.cast::<f64>() - a;

        let n = e0.cross(&e1);
        if n.norm_squared() < f64::EPSILON {
            return None;
        }
        let n = n.normalize();
        let d = n.dot(&a.coords);

        Some(Self {
            normal: n.cast::<f32>(),
            offset: d as f32,
            rel: Relation::default(),
        })
    }

    /// A zero plane used to keep the plane array index-parallel to the face
    /// array before [`make_planes`] runs.
    ///
    /// [`make_planes`]: crate::Pools::make_planes
    pub(crate) fn zeroed() -> Self {
        Self {
            normal: Vector3::zeros(),
            offset: 0.0,
            rel: Relation::default(),
        }
    }

    /// Returns the unit normal.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the signed distance of the plane from the origin.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Returns the scorer's classification tag.
    #[inline]
    pub fn relation(&self) -> Relation {
        self.rel
    }

    #[inline]
    pub(crate) fn set_relation(&mut self, rel: Relation) {
        self.rel = rel;
    }

    /// Signed distance from a point to the plane, positive on the normal
    /// side. Accumulated in double precision, returned as single.
    #[inline]
    pub fn signed_distance(&self, p: Point3<f32>) -> f32 {
        let n = self.normal.cast::<f64>();
        (n.dot(&p.cast::<f64>().coords) - f64::from(self.offset)) as f32
    }

    /// Classifies a point against the plane with [`PLANE_EPSILON`].
    pub fn classify_point(&self, p: Point3<f32>) -> PlaneSide {
        let d = self.signed_distance(p);
        if d <= -PLANE_EPSILON {
            PlaneSide::Behind
        } else if d >= PLANE_EPSILON {
            PlaneSide::Ahead
        } else {
            PlaneSide::On
        }
    }

    /// Classifies a whole triangle against the plane.
    ///
    /// Bails out after the second vertex when the first two already
    /// straddle. Vertices on the plane never force `Intersect`; a triangle
    /// touching the plane with an edge or corner stays on one side.
    pub fn classify_face(&self, face: &Face, verts: &[Point3<f32>]) -> Relation {
        let [a, b, c] = face.corners(verts);
        let mut neg = false;
        let mut pos = false;

        let d = self.signed_distance(a);
        if d <= -PLANE_EPSILON {
            neg = true;
        } else if d >= PLANE_EPSILON {
            pos = true;
        }

        let d = self.signed_distance(b);
        if d <= -PLANE_EPSILON {
            neg = true;
        } else if d >= PLANE_EPSILON {
            pos = true;
        }

        if neg && pos {
            return Relation::Intersect;
        }

        let d = self.signed_distance(c);
        if d <= -PLANE_EPSILON {
            neg = true;
        } else if d >= PLANE_EPSILON {
            pos = true;
        }

        match (neg, pos) {
            (true, true) => Relation::Intersect,
            (true, false) => Relation::Left,
            (false, true) => Relation::Right,
            (false, false) => Relation::Coincide,
        }
    }

    /// Intersects the segment `l0 → l1` with the plane.
    ///
    /// Returns `None` when the segment direction is parallel to the plane
    /// (discriminant below `f64::EPSILON`). The interpolation parameter is
    /// not clamped; callers must already know the endpoints straddle the
    /// plane, which the clip-side sign classification guarantees.
    pub fn intersect_segment(&self, l0: Point3<f32>, l1: Point3<f32>) -> Option<Point3<f32>> {
        let a = l0.cast::<f64>();
        let l = l1.cast::<f64>() - a;
        let n = self.normal.cast::<f64>();

        let denom = n.dot(&l);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = (f64::from(self.offset) - n.dot(&a.coords)) / denom;
        Some(Point3::from(a.coords + l * t).cast::<f32>())
    }

    /// Projects a point onto the plane (closest point on the plane).
    pub fn project_point(&self, p: Point3<f32>) -> Point3<f32> {
        let q = p.cast::<f64>();
        let n = self.normal.cast::<f64>();
        let dist = n.dot(&q.coords) - f64::from(self.offset);
        Point3::from(q.coords - n * dist).cast::<f32>()
    }
}
