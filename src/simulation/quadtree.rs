//! # Collision Quadtree (2D)
//!
//! Spatial index used by the collision pass to avoid testing every pair of
//! points. Built fresh for every collision iteration over the *predicted*
//! positions (`x + v`) of all points.
//!
//! - The chart area is recursively subdivided into 4 quadrants.
//! - Leaf nodes hold the points that fall inside them. A leaf holds more than
//!   one point only when those points coincide exactly or the depth limit is hit.
//! - Each node stores:
//!   - its bounding square
//!   - `max_radius`: the largest collision radius anywhere in its subtree
//!
//! A query for point `i` with radius `r_i` only descends into nodes whose box,
//! grown by `r_i + max_radius`, still contains `i`: nothing outside can touch it.

use crate::simulation::states::NVec2;

/// Hard cap on subdivision so clusters of near-identical points stay finite
const MAX_DEPTH: usize = 32;

/// A single quadtree node
///
/// Empty when `children` are all `None` and `bodies` is empty, a leaf when
/// `bodies` is non-empty, otherwise internal.
pub struct QuadNode {
    pub bbox_min: NVec2,
    pub bbox_max: NVec2,
    pub max_radius: f64,
    pub children: [Option<usize>; 4], // indices into CollisionTree::nodes
    pub bodies: Vec<usize>, // point indices stored in this leaf
}

impl QuadNode {
    fn empty(bbox_min: NVec2, bbox_max: NVec2) -> Self {
        Self {
            bbox_min,
            bbox_max,
            max_radius: 0.0,
            children: [None; 4],
            bodies: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }
}

/// Quadtree over a set of positions with per-point radii
pub struct CollisionTree {
    pub nodes: Vec<QuadNode>,
    pub root: usize,
}

impl CollisionTree {
    /// Build a tree from `positions[i]` with collision radius `radii[i]`
    ///
    /// 1. Computes a square bounding box around every position.
    /// 2. Inserts each point, subdividing occupied leaves.
    /// 3. Propagates `max_radius` bottom-up.
    ///
    /// `positions` and `radii` must have the same length.
    pub fn build(positions: &[NVec2], radii: &[f64]) -> Self {
        let (bbox_min, bbox_max) = compute_global_bbox(positions);
        let mut tree = CollisionTree {
            nodes: vec![QuadNode::empty(bbox_min, bbox_max)],
            root: 0,
        };

        for i in 0..positions.len() {
            tree.insert_body(tree.root, i, positions, 0);
        }

        tree.compute_max_radius(radii, tree.root);
        tree
    }

    /// Push into `out` every point index `j > i` whose node could overlap
    /// the circle of radius `radius` around `pos`
    ///
    /// Candidates come out in ascending index order, like the direct scan.
    pub fn candidates(&self, i: usize, pos: NVec2, radius: f64, out: &mut Vec<usize>) {
        out.clear();
        self.visit(self.root, i, pos, radius, out);
        out.sort_unstable();
    }

    // helpers ==============================================================================

    fn visit(&self, node_idx: usize, i: usize, pos: NVec2, radius: f64, out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];
        let reach = radius + node.max_radius;

        // Prune: the grown box does not contain the query point
        if node.bbox_min.x > pos.x + reach
            || node.bbox_max.x < pos.x - reach
            || node.bbox_min.y > pos.y + reach
            || node.bbox_max.y < pos.y - reach
        {
            return;
        }

        out.extend(node.bodies.iter().copied().filter(|&j| j > i));

        for child in node.children.iter().flatten() {
            self.visit(*child, i, pos, radius, out);
        }
    }

    /// Insert point `body_idx`, starting at `node_idx`
    ///
    /// - empty leaf -> store the point here
    /// - occupied leaf, coincident point or depth limit -> share the leaf
    /// - occupied leaf otherwise -> subdivide, push the residents down, recurse
    /// - internal node -> descend into the matching quadrant
    fn insert_body(&mut self, node_idx: usize, body_idx: usize, positions: &[NVec2], depth: usize) {
        let bbox_min = self.nodes[node_idx].bbox_min;
        let bbox_max = self.nodes[node_idx].bbox_max;
        let pos = positions[body_idx];

        if self.nodes[node_idx].is_leaf() {
            let node = &mut self.nodes[node_idx];
            if node.bodies.is_empty() {
                node.bodies.push(body_idx);
                return;
            }
            if positions[node.bodies[0]] == pos || depth >= MAX_DEPTH {
                node.bodies.push(body_idx);
                return;
            }

            let residents = std::mem::take(&mut node.bodies);
            for resident in residents {
                self.descend(node_idx, resident, positions, depth, bbox_min, bbox_max);
            }
        }

        self.descend(node_idx, body_idx, positions, depth, bbox_min, bbox_max);
    }

    fn descend(&mut self, node_idx: usize, body_idx: usize, positions: &[NVec2], depth: usize, bbox_min: NVec2, bbox_max: NVec2) {
        let quadrant = child_index_for_point(&positions[body_idx], &bbox_min, &bbox_max);
        let child_node_idx = match self.nodes[node_idx].children[quadrant] {
            Some(idx) => idx,
            None => {
                let (cmin, cmax) = child_bbox(&bbox_min, &bbox_max, quadrant);
                let new_idx = self.nodes.len();
                self.nodes.push(QuadNode::empty(cmin, cmax));
                self.nodes[node_idx].children[quadrant] = Some(new_idx);
                new_idx
            }
        };
        self.insert_body(child_node_idx, body_idx, positions, depth + 1);
    }

    /// Bottom-up pass filling `max_radius` for every node
    fn compute_max_radius(&mut self, radii: &[f64], node_idx: usize) -> f64 {
        let children = self.nodes[node_idx].children;
        let mut max_radius = self.nodes[node_idx]
            .bodies
            .iter()
            .map(|&b| radii[b])
            .fold(0.0_f64, f64::max);

        for child in children.iter().flatten() {
            max_radius = max_radius.max(self.compute_max_radius(radii, *child));
        }

        self.nodes[node_idx].max_radius = max_radius;
        max_radius
    }
}

// helpers ===========================================================================

/// Square bounding box enclosing every position
/// A single point (or none) still yields a unit square so children have area
fn compute_global_bbox(positions: &[NVec2]) -> (NVec2, NVec2) {
    let mut min = NVec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = NVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

    for p in positions {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    if positions.is_empty() {
        return (NVec2::zeros(), NVec2::new(1.0, 1.0));
    }

    let center = (min + max) * 0.5;
    let half = ((max.x - min.x).max(max.y - min.y) * 0.5).max(0.5);
    let half = NVec2::new(half, half);
    (center - half, center + half)
}

/// Quadrant index for a point: bit 0 = right half, bit 1 = lower half
fn child_index_for_point(p: &NVec2, bbox_min: &NVec2, bbox_max: &NVec2) -> usize {
    let center = (bbox_min + bbox_max) * 0.5;
    let mut idx = 0;

    if p.x >= center.x { idx |= 1; }
    if p.y >= center.y { idx |= 2; }

    idx
}

fn child_bbox(parent_min: &NVec2, parent_max: &NVec2, child_idx: usize) -> (NVec2, NVec2) {
    let center = (parent_min + parent_max) * 0.5;

    let mut min = *parent_min;
    let mut max = *parent_max;

    if (child_idx & 1) == 0 {
        max.x = center.x;
    } else {
        min.x = center.x;
    }

    if (child_idx & 2) == 0 {
        max.y = center.y;
    } else {
        min.y = center.y;
    }

    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(i: usize, positions: &[NVec2], radii: &[f64]) -> Vec<usize> {
        (i + 1..positions.len())
            .filter(|&j| (positions[i] - positions[j]).norm() < radii[i] + radii[j])
            .collect()
    }

    #[test]
    fn candidates_cover_every_true_overlap() {
        let positions: Vec<NVec2> = (0..40)
            .map(|k| {
                let k = k as f64;
                NVec2::new((k * 0.37).sin() * 60.0 + 100.0, (k * 0.13).cos() * 60.0 + 100.0)
            })
            .collect();
        let radii: Vec<f64> = (0..40).map(|k| 2.0 + (k % 5) as f64).collect();
        let tree = CollisionTree::build(&positions, &radii);

        let mut out = Vec::new();
        for i in 0..positions.len() {
            tree.candidates(i, positions[i], radii[i], &mut out);
            for j in brute_force(i, &positions, &radii) {
                assert!(out.contains(&j), "pair ({i}, {j}) missed by the tree");
            }
        }
    }

    #[test]
    fn coincident_points_share_a_leaf() {
        let positions = vec![NVec2::new(5.0, 5.0); 3];
        let radii = vec![1.0; 3];
        let tree = CollisionTree::build(&positions, &radii);

        let mut out = Vec::new();
        tree.candidates(0, positions[0], radii[0], &mut out);
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn distant_points_are_pruned() {
        let positions = vec![NVec2::new(0.0, 0.0), NVec2::new(1000.0, 1000.0), NVec2::new(3.0, 0.0)];
        let radii = vec![2.0, 2.0, 2.0];
        let tree = CollisionTree::build(&positions, &radii);

        let mut out = Vec::new();
        tree.candidates(0, positions[0], radii[0], &mut out);
        assert_eq!(out, vec![2]);
    }
}
