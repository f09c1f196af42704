//! Top-level BSP construction: pivot selection, in-place partitioning,
//! node allocation, and the range bookkeeping that keeps the recursion
//! honest while clips grow the pool underneath it.

use log::{error, warn};

use crate::NIL;
use crate::plane::{Plane, Relation};
use crate::pools::Pools;

use super::Window;
use super::clip;
use super::node::{BspNode, NodeArena};
use super::rebalance;
use super::score;

/// Diagnostic counters for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// In-place rebalancing moves performed.
    pub swaps: u32,
    /// Deepest recursion level reached (1 for a single-node tree).
    pub max_depth: u32,
    /// New triangles produced by clipping.
    pub clips: u32,
}

/// A built BSP tree.
///
/// Nodes live in an indexed arena and reference contiguous bands of the
/// face pool the tree was built over; the tree owns no geometry itself.
/// The final face order in the pool is meaningful: an in-order traversal
/// (left subtree, band, right subtree) visits the pool strictly left to
/// right.
#[derive(Debug, Clone)]
pub struct BspTree {
    arena: NodeArena,
    root: u16,
    stats: BuildStats,
}

impl BspTree {
    /// Partitions the pooled faces in place and records the tree.
    ///
    /// Expects [`Pools::make_planes`] to have populated the plane cache.
    /// The build itself does not fail: exhausting an arena abandons the
    /// offending sub-range (logged) while the rest of the tree finalizes,
    /// and an empty pool yields an empty tree.
    pub fn build(pools: &mut Pools) -> Self {
        let n = pools.face_count();
        let mut partitioner = Partitioner {
            pools,
            arena: NodeArena::with_capacity(n * 2),
            stats: BuildStats::default(),
        };

        let mut win = Window {
            l: 0,
            r: n as u16,
            pl: 0,
            pr: 0,
        };
        let root = partitioner.iter(&mut win, 1);

        Self {
            arena: partitioner.arena,
            root,
            stats: partitioner.stats,
        }
    }

    /// Returns the root node id, or `None` for an empty tree.
    #[inline]
    pub fn root(&self) -> Option<u16> {
        (self.root != NIL).then_some(self.root)
    }

    /// Looks up a node by id.
    #[inline]
    pub fn node(&self, id: u16) -> Option<&BspNode> {
        self.arena.get(id)
    }

    /// Returns the number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Returns the diagnostic counters of the build.
    #[inline]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Returns a node's inclusive coplanar face range.
    pub fn node_faces(&self, id: u16) -> Option<(u16, u16)> {
        self.node(id).map(BspNode::faces)
    }

    /// Returns a node's splitting plane, which is the supporting plane of
    /// the first face in its band.
    pub fn node_plane<'p>(&self, pools: &'p Pools, id: u16) -> Option<&'p Plane> {
        let (pl, _) = self.node_faces(id)?;
        ((pl as usize) < pools.face_count()).then(|| pools.plane(pl))
    }
}

/// Build context threaded through the recursion.
struct Partitioner<'a> {
    pools: &'a mut Pools,
    arena: NodeArena,
    stats: BuildStats,
}

impl Partitioner<'_> {
    /// Recursively partitions `[win.l, win.r)`, returning the new node id
    /// (or [`NIL`] for an empty range or an abandoned branch). On return,
    /// `win` reflects any growth the sub-build caused by clipping.
    fn iter(&mut self, win: &mut Window, depth: u32) -> u16 {
        if win.l >= win.r {
            return NIL;
        }
        self.stats.max_depth = self.stats.max_depth.max(depth);

        // Score every candidate pivot in the range; first wins ties.
        let mut best = win.l;
        let mut best_survey = score::survey(self.pools, win.l, best, win.r);
        if !best_survey.is_perfect() {
            for i in win.l + 1..win.r {
                let sv = score::survey(self.pools, win.l, i, win.r);
                if sv.score() < best_survey.score()
                    || (sv.score() == best_survey.score()
                        && sv.intersections < best_survey.intersections)
                {
                    best = i;
                    best_survey = sv;
                    if best_survey.is_perfect() {
                        break;
                    }
                }
            }
        }

        win.pl = best;
        win.pr = best;
        let id = self.partition(win);
        if id == NIL {
            error!(
                "BSP node allocation failed; abandoning range [{}, {})",
                win.l, win.r
            );
            return NIL;
        }

        // Left child first. Its clips insert strictly left of our band,
        // so the whole frame shifts right by the child's growth.
        let mut sub = Window {
            l: win.l,
            r: win.pl,
            pl: 0,
            pr: 0,
        };
        let child = self.iter(&mut sub, depth + 1);
        self.arena.insert_left(id, child);
        let grown = sub.r - win.pl;
        win.pl += grown;
        win.pr += grown;
        win.r += grown;

        // Right child. Its clips land right of our band and only move the
        // end of the range.
        let mut sub = Window {
            l: win.pr + 1,
            r: win.r,
            pl: 0,
            pr: 0,
        };
        let child = self.iter(&mut sub, depth + 1);
        self.arena.insert_right(id, child);
        win.r = sub.r;

        id
    }

    /// Sweeps both flanks of the pivot, re-siding, folding, or clipping
    /// each face until the window invariant holds, then allocates the
    /// node for the final band.
    fn partition(&mut self, win: &mut Window) -> u16 {
        let mut i = win.l;
        while i < win.pl {
            match self.relation(win.pl, i) {
                Relation::Left => i += 1,
                Relation::Right => {
                    self.stats.swaps += 1;
                    rebalance::move_right(self.pools, win.pl, win.pr, i);
                    win.pl -= 1;
                    win.pr -= 1;
                    // The displaced neighbour now sits at i, still unseen.
                }
                Relation::Coincide => {
                    self.stats.swaps += 1;
                    rebalance::move_coincident(self.pools, win.pl, win.pr, i);
                    win.pl -= 1;
                }
                Relation::Intersect => i += self.clip(win, i) + 1,
            }
        }

        let mut i = win.pr + 1;
        while i < win.r {
            match self.relation(win.pl, i) {
                Relation::Left => {
                    self.stats.swaps += 1;
                    rebalance::move_left(self.pools, win.pl, win.pr, i);
                    win.pl += 1;
                    win.pr += 1;
                    if win.pr + 1 >= i {
                        i += 1;
                    }
                }
                Relation::Right => i += 1,
                Relation::Coincide => {
                    self.stats.swaps += 1;
                    rebalance::move_coincident(self.pools, win.pl, win.pr, i);
                    win.pr += 1;
                    if win.pr + 1 >= i {
                        i += 1;
                    }
                }
                Relation::Intersect => i += self.clip(win, i) + 1,
            }
        }

        match self.arena.new_node(win.pl, win.pr) {
            Some(id) => id,
            None => NIL,
        }
    }

    fn relation(&self, pivot: u16, face: u16) -> Relation {
        let face = self.pools.face(face);
        self.pools
            .plane(pivot)
            .classify_face(&face, self.pools.verts())
    }

    /// Clips face `i` against the pivot plane, returning how many extra
    /// indices the sweep must skip. A rejected clip leaves the face where
    /// it is, unpartitioned.
    fn clip(&mut self, win: &mut Window, i: u16) -> u16 {
        let clipper = win.pl;
        match clip::clip_face(win, self.pools, i, clipper) {
            Ok(outcome) => {
                self.stats.clips += u32::from(outcome.inserted);
                outcome.advance
            }
            Err(e) => {
                warn!("face {i} left unpartitioned: {e}");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Face;
    use nalgebra::Point3;

    fn pools_from(verts: &[[f32; 3]], faces: &[[u16; 3]]) -> Pools {
        let verts = verts
            .iter()
            .map(|v| Point3::new(v[0], v[1], v[2]))
            .collect();
        let faces = faces.iter().map(|f| Face::new(f[0], f[1], f[2])).collect();
        let mut p = Pools::from_mesh(verts, faces).unwrap();
        p.make_planes().unwrap();
        p
    }

    fn bands_in_order(tree: &BspTree, id: u16, out: &mut Vec<(u16, u16)>) {
        let node = tree.node(id).unwrap();
        if let Some(l) = node.left() {
            bands_in_order(tree, l, out);
        }
        out.push(node.faces());
        if let Some(r) = node.right() {
            bands_in_order(tree, r, out);
        }
    }

    // Checks every post-build invariant that holds for any input: parallel
    // face/plane arrays, in-order bands tiling the pool, coplanar bands,
    // one-sided subtrees, and parent/child link symmetry.
    fn assert_well_formed(tree: &BspTree, pools: &Pools) {
        assert_eq!(pools.planes().len(), pools.faces().len());
        for i in 0..pools.face_count() as u16 {
            let derived = Plane::from_face(&pools.face(i), pools.verts()).unwrap();
            let cached = pools.plane(i);
            assert!(
                (cached.normal() - derived.normal()).norm() < 1e-4
                    && (cached.offset() - derived.offset()).abs() < 1e-4,
                "plane cache for face {i} is stale"
            );
        }

        let Some(root) = tree.root() else {
            assert_eq!(pools.face_count(), 0);
            return;
        };
        assert_eq!(tree.node(root).unwrap().parent(), None);

        let mut bands = Vec::new();
        bands_in_order(tree, root, &mut bands);
        assert_eq!(bands.len(), tree.len());
        let mut next = 0u32;
        for &(pl, pr) in &bands {
            assert_eq!(u32::from(pl), next, "bands must tile the pool in order");
            assert!(pr >= pl);
            next = u32::from(pr) + 1;
        }
        assert_eq!(next as usize, pools.face_count());

        assert_node(tree, pools, root);
    }

    fn assert_node(tree: &BspTree, pools: &Pools, id: u16) {
        let node = tree.node(id).unwrap();
        let (pl, pr) = node.faces();
        let plane = *pools.plane(pl);

        for i in pl..=pr {
            let f = pools.face(i);
            assert_eq!(
                plane.classify_face(&f, pools.verts()),
                Relation::Coincide,
                "band face {i} is not coplanar with its node"
            );
        }

        for (child, wanted) in [(node.left(), Relation::Left), (node.right(), Relation::Right)] {
            let Some(child) = child else { continue };
            assert_eq!(tree.node(child).unwrap().parent(), Some(id));

            let mut bands = Vec::new();
            bands_in_order(tree, child, &mut bands);
            for (bl, br) in bands {
                for i in bl..=br {
                    let rel = plane.classify_face(&pools.face(i), pools.verts());
                    assert!(
                        rel == wanted || rel == Relation::Coincide,
                        "face {i} classifies {rel:?} against ancestor {id}"
                    );
                }
            }
            assert_node(tree, pools, child);
        }
    }

    #[test]
    fn empty_pool_builds_empty_tree() {
        let mut pools = Pools::new();
        let tree = BspTree::build(&mut pools);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.stats(), BuildStats::default());
    }

    #[test]
    fn single_triangle() {
        let mut pools = pools_from(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
        );
        let tree = BspTree::build(&mut pools);

        assert_eq!(tree.len(), 1);
        let root = tree.root().unwrap();
        assert_eq!(tree.node_faces(root), Some((0, 0)));
        assert!(tree.node(root).unwrap().is_leaf());
        assert_eq!(tree.stats().clips, 0);
        assert_eq!(tree.stats().max_depth, 1);
        assert_well_formed(&tree, &pools);
    }

    #[test]
    fn coplanar_quad_shares_one_band() {
        let mut pools = pools_from(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            &[[0, 1, 2], [0, 2, 3]],
        );
        let tree = BspTree::build(&mut pools);

        assert_eq!(tree.len(), 1);
        let root = tree.root().unwrap();
        assert_eq!(tree.node_faces(root), Some((0, 1)));
        assert!(tree.node(root).unwrap().is_leaf());
        assert_eq!(tree.stats().clips, 0);
        assert_well_formed(&tree, &pools);
    }

    #[test]
    fn disjoint_perpendicular_pair() {
        // Second triangle floats wholly on one side of the first's plane.
        let mut pools = pools_from(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [0.5, 0.0, 2.0],
            ],
            &[[0, 1, 2], [3, 4, 5]],
        );
        let tree = BspTree::build(&mut pools);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.stats().clips, 0);
        assert_eq!(tree.stats().max_depth, 2);
        let root = tree.root().unwrap();
        let root_node = tree.node(root).unwrap();
        assert!(root_node.left().is_some() != root_node.right().is_some());
        assert_well_formed(&tree, &pools);
    }

    #[test]
    fn straddling_triangle_is_clipped() {
        // The second triangle pierces the first's plane with a lone corner,
        // so the clip splits both of its crossing edges.
        let mut pools = pools_from(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, -1.0],
                [1.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
            ],
            &[[0, 1, 2], [3, 4, 5]],
        );
        let before = pools.face_count();
        let tree = BspTree::build(&mut pools);

        assert_eq!(tree.stats().clips, 2);
        assert_eq!(pools.face_count(), before + tree.stats().clips as usize);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.stats().max_depth, 2);
        let root = tree.root().unwrap();
        let root_node = tree.node(root).unwrap();
        assert!(root_node.left().is_some() && root_node.right().is_some());
        assert_well_formed(&tree, &pools);
    }

    #[test]
    fn tetrahedron_builds_a_chain() {
        // Any pivot of a tetrahedron leaves the other three faces in one
        // half-space, so no clipping can occur.
        let mut pools = pools_from(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            &[[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]],
        );
        let tree = BspTree::build(&mut pools);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.stats().clips, 0);
        assert_eq!(tree.stats().max_depth, 4);
        for id in 0..tree.len() as u16 {
            let node = tree.node(id).unwrap();
            assert!(
                node.left().is_none() || node.right().is_none(),
                "tetrahedron build must form a chain"
            );
        }
        assert_well_formed(&tree, &pools);
    }

    #[test]
    fn crossed_quads_stay_consistent() {
        // Two quads crossing along the y axis; both sides of each must be
        // separated, forcing at least two clips.
        let mut pools = pools_from(
            &[
                [-1.0, -1.0, 0.0],
                [1.0, -1.0, 0.0],
                [1.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0],
                [0.0, -1.0, -1.0],
                [0.0, 1.0, -1.0],
                [0.0, 1.0, 1.0],
                [0.0, -1.0, 1.0],
            ],
            &[[0, 1, 2], [0, 2, 3], [4, 5, 6], [4, 6, 7]],
        );
        let before = pools.face_count();
        let tree = BspTree::build(&mut pools);

        assert!(tree.stats().clips >= 2);
        assert_eq!(pools.face_count(), before + tree.stats().clips as usize);
        assert_well_formed(&tree, &pools);
    }

    #[test]
    fn vertices_only_grow_during_build() {
        let mut pools = pools_from(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, -1.0],
                [1.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
            ],
            &[[0, 1, 2], [3, 4, 5]],
        );
        let original: Vec<_> = pools.verts().to_vec();
        let tree = BspTree::build(&mut pools);

        assert!(pools.vert_count() >= original.len());
        assert_eq!(&pools.verts()[..original.len()], &original[..]);
        assert!(tree.stats().clips > 0);
    }
}
