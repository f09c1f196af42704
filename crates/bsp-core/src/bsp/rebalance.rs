//! In-place moves that re-side a triangle relative to the pivot band.
//!
//! The partition invariant at any moment is
//!
//! ```text
//! [ l ............... pl .. pr ............... r )
//!     left (negative)   band    right (positive)
//! ```
//!
//! and every move here restores it after a triangle is found on the wrong
//! side: the band slides by one slot and the offender swaps with the
//! neighbour just outside the band. Faces and planes move in lockstep; no
//! geometry is recomputed. Callers adjust `pl`/`pr` by one after a banded
//! move (both toward the element's former side) and count the move in the
//! swap statistics.

use crate::pools::Pools;

/// Rotates `elem` (left of the single-slot pivot) to the pivot's right.
///
/// The element takes the pivot's slot, the pivot's left neighbour fills
/// the element's slot, and the pivot lands in the neighbour's. When the
/// element is the neighbour itself this is a plain swap.
pub(crate) fn move_right_simple(pools: &mut Pools, pivot: u16, elem: u16) {
    let (pivot, elem) = (pivot as usize, elem as usize);
    debug_assert!(elem < pivot, "element is already on the right");

    let (faces, planes) = pools.entries_mut();
    let f_swp = faces[pivot];
    let p_swp = planes[pivot];

    faces[pivot] = faces[elem];
    planes[pivot] = planes[elem];

    if pivot - 1 != elem {
        faces[elem] = faces[pivot - 1];
        planes[elem] = planes[pivot - 1];
        faces[pivot - 1] = f_swp;
        planes[pivot - 1] = p_swp;
    } else {
        faces[elem] = f_swp;
        planes[elem] = p_swp;
    }
}

/// Mirror of [`move_right_simple`]: `elem` sits right of the pivot.
pub(crate) fn move_left_simple(pools: &mut Pools, pivot: u16, elem: u16) {
    let (pivot, elem) = (pivot as usize, elem as usize);
    debug_assert!(elem > pivot, "element is already on the left");

    let (faces, planes) = pools.entries_mut();
    let f_swp = faces[pivot];
    let p_swp = planes[pivot];

    faces[pivot] = faces[elem];
    planes[pivot] = planes[elem];

    if pivot + 1 != elem {
        faces[elem] = faces[pivot + 1];
        planes[elem] = planes[pivot + 1];
        faces[pivot + 1] = f_swp;
        planes[pivot + 1] = p_swp;
    } else {
        faces[elem] = f_swp;
        planes[elem] = p_swp;
    }
}

/// Moves `elem` (right of the band) to the band's left: the band `[pl, pr]`
/// slides right by one and `elem` exchanges with the neighbour at `pr + 1`.
///
/// The caller must bump its `pl` and `pr` by one afterwards.
pub(crate) fn move_left(pools: &mut Pools, pl: u16, pr: u16, elem: u16) {
    if pl == pr {
        return move_left_simple(pools, pl, elem);
    }
    let (pl, pr, elem) = (pl as usize, pr as usize, elem as usize);
    debug_assert!(pl < pr);
    debug_assert!(elem > pr, "element is already on the left");

    let (faces, planes) = pools.entries_mut();
    let f_swp = faces[pr + 1];
    let p_swp = planes[pr + 1];

    faces.copy_within(pl..=pr, pl + 1);
    planes.copy_within(pl..=pr, pl + 1);

    if pr + 1 != elem {
        faces[pl] = faces[elem];
        planes[pl] = planes[elem];
        faces[elem] = f_swp;
        planes[elem] = p_swp;
    } else {
        faces[pl] = f_swp;
        planes[pl] = p_swp;
    }
}

/// Mirror of [`move_left`]: the band slides left and `elem` exchanges with
/// the neighbour at `pl - 1`. The caller decrements `pl` and `pr`.
pub(crate) fn move_right(pools: &mut Pools, pl: u16, pr: u16, elem: u16) {
    if pl == pr {
        return move_right_simple(pools, pl, elem);
    }
    let (pl, pr, elem) = (pl as usize, pr as usize, elem as usize);
    debug_assert!(pl < pr);
    debug_assert!(elem < pl, "element is already on the right");

    let (faces, planes) = pools.entries_mut();
    let f_swp = faces[pl - 1];
    let p_swp = planes[pl - 1];

    faces.copy_within(pl..=pr, pl - 1);
    planes.copy_within(pl..=pr, pl - 1);

    if pl - 1 != elem {
        faces[pr] = faces[elem];
        planes[pr] = planes[elem];
        faces[elem] = f_swp;
        planes[elem] = p_swp;
    } else {
        faces[pr] = f_swp;
        planes[pr] = p_swp;
    }
}

/// Folds `elem` into the pivot band: the band slides one slot toward the
/// element and the element takes the vacated slot at the band's far end.
///
/// The caller grows the band by one on the element's side (`pl - 1` or
/// `pr + 1`). Folding a slot already inside the band is a caller bug.
pub(crate) fn move_coincident(pools: &mut Pools, pl: u16, pr: u16, elem: u16) {
    let (pl, pr, elem) = (pl as usize, pr as usize, elem as usize);
    debug_assert!(pl <= pr);

    let (faces, planes) = pools.entries_mut();

    if elem < pl {
        let f_swp = faces[pl - 1];
        let p_swp = planes[pl - 1];

        faces.copy_within(pl..=pr, pl - 1);
        planes.copy_within(pl..=pr, pl - 1);

        if elem == pl - 1 {
            // The element was the displaced neighbour; its saved value
            // fills the vacated slot directly.
            faces[pr] = f_swp;
            planes[pr] = p_swp;
        } else {
            faces[pr] = faces[elem];
            planes[pr] = planes[elem];
            faces[elem] = f_swp;
            planes[elem] = p_swp;
        }
    } else if elem > pr {
        if elem == pr + 1 {
            return;
        }
        faces.swap(pr + 1, elem);
        planes.swap(pr + 1, elem);
    } else {
        debug_assert!(false, "element {elem} already inside the band");
    }
}
