//! Triangle clipping against the pivot plane.
//!
//! A straddling triangle is split into two or three sub-triangles that
//! jointly cover it exactly, then redistributed around the pivot band:
//!
//! - the original face slot is overwritten with the sub-triangle that
//!   stays on the face's current side of the band;
//! - a sub-triangle for the same side is inserted next to the replaced
//!   face, and the sweep is told to skip it via `advance`;
//! - a sub-triangle for the opposite side is inserted adjacent to the band
//!   on that side, shifting `pl`, `pr`, and `r` to match.
//!
//! Either both pools accept the new entries or the face is left untouched;
//! headroom for two vertices and two faces is reserved up front.

use log::debug;

use crate::error::{BuildError, PoolError};
use crate::face::Face;
use crate::plane::PLANE_EPSILON;
use crate::pools::Pools;

use super::Window;

/// What a successful clip did to the face array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ClipOutcome {
    /// Extra indices the partition sweep must skip because new faces landed
    /// between the sweep cursor and the next unvisited element.
    pub advance: u16,
    /// Number of faces inserted (0 when the clip was a no-op).
    pub inserted: u16,
}

/// Clips the face at `face_i` against the plane of face `clipper_i`,
/// updating the pivot window for every insertion.
///
/// A face that turns out to lie entirely on one side (possible only at the
/// epsilon boundary) is left untouched and reported as a no-op. A face
/// inside the pivot band is a caller bug and is rejected.
pub(crate) fn clip_face(
    win: &mut Window,
    pools: &mut Pools,
    face_i: u16,
    clipper_i: u16,
) -> Result<ClipOutcome, BuildError> {
    pools.vert_declare(2)?;
    pools.face_declare(2)?;

    let n_faces = pools.face_count();
    if face_i as usize >= n_faces {
        return Err(PoolError::PositionOutOfRange { pos: face_i }.into());
    }
    if clipper_i as usize >= n_faces {
        return Err(PoolError::PositionOutOfRange { pos: clipper_i }.into());
    }
    if face_i >= win.pl && face_i <= win.pr {
        return Err(BuildError::PivotClipped {
            face: face_i,
            pl: win.pl,
            pr: win.pr,
        });
    }

    let clipper = *pools.plane(clipper_i);
    // Sub-triangles are coplanar with their source; they inherit this
    // plane by value so later inserts cannot hand them a shifted slot.
    let face_plane = *pools.plane(face_i);

    let f = pools.face(face_i);
    if f.max_index() as usize >= pools.vert_count() {
        return Err(PoolError::VertexOutOfRange {
            face: face_i,
            vertex: f.max_index(),
        }
        .into());
    }

    let mut v = f.indices();
    let e = [
        clipper.signed_distance(pools.vert(v[0])),
        clipper.signed_distance(pools.vert(v[1])),
        clipper.signed_distance(pools.vert(v[2])),
    ];

    // Reorder the corners cyclically so that v[0] ends up isolated on one
    // side (or on the plane for a single-edge split) with v[1], v[2]
    // jointly opposite. `two`: both edges out of v[0] cross the plane.
    // `left_light`: the negative side received the lone corner: v[0] for
    // double splits, v[1] for single splits.
    let mut two = false;
    let mut left_light = false;
    const EPS: f32 = PLANE_EPSILON;

    if e[0] <= -EPS {
        if e[1] <= -EPS {
            two = true;
            if e[2] < EPS {
                debug!("clip rejected: face {face_i} entirely behind the clipper");
                return Ok(ClipOutcome::default());
            }
            v.rotate_right(1); // lone v2 ahead
        } else if e[1] >= EPS {
            if e[2] <= -EPS {
                two = true;
                v.rotate_left(1); // lone v1 ahead
            } else if e[2] >= EPS {
                two = true;
                left_light = true; // lone v0 behind, already in place
            } else {
                left_light = true;
                v.rotate_right(1); // v2 on the plane, single split
            }
        } else {
            // v1 on the plane
            if e[2] < EPS {
                debug!("clip rejected: face {face_i} entirely behind the clipper");
                return Ok(ClipOutcome::default());
            }
            v.rotate_left(1); // single split, v1 ahead of v0's slot
        }
    } else if e[0] >= EPS {
        if e[1] >= EPS {
            two = true;
            if e[2] > -EPS {
                debug!("clip rejected: face {face_i} entirely ahead of the clipper");
                return Ok(ClipOutcome::default());
            }
            left_light = true;
            v.rotate_right(1); // lone v2 behind
        } else if e[1] <= -EPS {
            if e[2] <= -EPS {
                two = true; // lone v0 ahead, already in place
            } else if e[2] >= EPS {
                two = true;
                left_light = true;
                v.rotate_left(1); // lone v1 behind
            } else {
                v.rotate_right(1); // v2 on the plane, single split
            }
        } else {
            // v1 on the plane
            if e[2] > -EPS {
                debug!("clip rejected: face {face_i} entirely ahead of the clipper");
                return Ok(ClipOutcome::default());
            }
            left_light = true;
            v.rotate_left(1);
        }
    } else {
        // v0 on the plane; only a single split can come of it
        if e[1] <= -EPS {
            if e[2] < EPS {
                debug!("clip rejected: face {face_i} entirely behind the clipper");
                return Ok(ClipOutcome::default());
            }
            left_light = true;
        } else if e[1] >= EPS {
            if e[2] > -EPS {
                debug!("clip rejected: face {face_i} entirely ahead of the clipper");
                return Ok(ClipOutcome::default());
            }
        } else {
            debug!("clip rejected: an edge of face {face_i} lies in the clipper");
            return Ok(ClipOutcome::default());
        }
    }

    let p0 = pools.vert(v[0]);
    let p1 = pools.vert(v[1]);
    let p2 = pools.vert(v[2]);

    let mut out = ClipOutcome::default();

    if two {
        // Both edges out of the lone corner cross: one corner triangle,
        // and a quad split into two triangles on the other side.
        let a = clipper
            .intersect_segment(p0, p1)
            .ok_or(BuildError::ParallelSegment)?;
        let b = clipper
            .intersect_segment(p0, p2)
            .ok_or(BuildError::ParallelSegment)?;
        let ev0 = pools.vert_add(a)?;
        let ev1 = pools.vert_add(b)?;

        if face_i > win.pr {
            if left_light {
                // Quad stays right of the band; the lone corner crosses.
                pools.set_face(face_i, Face::new(ev0, v[1], v[2]));
                pools.face_insert(face_i + 1, Face::new(v[2], ev1, ev0), Some(face_plane))?;
                out.inserted += 1;
                win.r += 1;
                out.advance += 1;

                pools.face_insert(win.pl, Face::new(v[0], ev0, ev1), Some(face_plane))?;
                out.inserted += 1;
                win.pl += 1;
                win.pr += 1;
                win.r += 1;
                out.advance += 1;
            } else {
                // The lone corner stays right; the quad crosses left.
                pools.set_face(face_i, Face::new(v[0], ev0, ev1));
                pools.face_insert(win.pl, Face::new(ev0, v[1], v[2]), Some(face_plane))?;
                out.inserted += 1;
                win.pl += 1;
                win.pr += 1;
                win.r += 1;
                out.advance += 1;

                pools.face_insert(win.pl, Face::new(v[2], ev1, ev0), Some(face_plane))?;
                out.inserted += 1;
                win.pl += 1;
                win.pr += 1;
                win.r += 1;
                out.advance += 1;
            }
        } else if face_i < win.pl {
            if left_light {
                // The lone corner stays left; the quad crosses right.
                pools.set_face(face_i, Face::new(v[0], ev0, ev1));
                pools.face_insert(win.pr + 1, Face::new(ev0, v[1], v[2]), Some(face_plane))?;
                out.inserted += 1;
                win.r += 1;

                pools.face_insert(win.pr + 1, Face::new(v[2], ev1, ev0), Some(face_plane))?;
                out.inserted += 1;
                win.r += 1;
            } else {
                // Quad stays left; the lone corner crosses right.
                pools.set_face(face_i, Face::new(ev0, v[1], v[2]));
                pools.face_insert(win.pr + 1, Face::new(v[0], ev0, ev1), Some(face_plane))?;
                out.inserted += 1;
                win.r += 1;

                pools.face_insert(win.pl, Face::new(v[2], ev1, ev0), Some(face_plane))?;
                out.inserted += 1;
                win.r += 1;
                win.pl += 1;
                win.pr += 1;
            }
        } else {
            unreachable!("pivot band face guarded above");
        }
    } else {
        // One corner sits on the plane; a single edge crossing splits the
        // face into one triangle per side.
        let a = clipper
            .intersect_segment(p1, p2)
            .ok_or(BuildError::ParallelSegment)?;
        let ev = pools.vert_add(a)?;

        if face_i > win.pr {
            let (keep, new) = if left_light {
                (Face::new(v[0], ev, v[2]), Face::new(v[0], v[1], ev))
            } else {
                (Face::new(v[0], v[1], ev), Face::new(v[0], ev, v[2]))
            };
            pools.set_face(face_i, keep);
            pools.face_insert(win.pl, new, Some(face_plane))?;
            out.inserted += 1;
            win.pl += 1;
            win.pr += 1;
            win.r += 1;
            out.advance += 1;
        } else if face_i < win.pl {
            let (keep, new) = if left_light {
                (Face::new(v[0], v[1], ev), Face::new(v[0], ev, v[2]))
            } else {
                (Face::new(v[0], ev, v[2]), Face::new(v[0], v[1], ev))
            };
            pools.set_face(face_i, keep);
            pools.face_insert(win.pr + 1, new, Some(face_plane))?;
            out.inserted += 1;
            win.r += 1;
        } else {
            unreachable!("pivot band face guarded above");
        }
    }

    Ok(out)
}
