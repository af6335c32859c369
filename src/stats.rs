//! Structural introspection: how many nodes of each flavor a tree holds and
//! how densely they are populated. Debug tooling; also what black-box tests
//! use to observe flavor transitions.

use std::collections::HashMap;

#[derive(Debug)]
pub struct NodeStats {
    /// Child capacity of the flavor this entry describes.
    pub width: usize,
    pub total_nodes: usize,
    pub total_children: usize,
    /// Children actually present over children representable.
    pub density: f64,
}

#[derive(Debug, Default)]
pub struct TreeStats {
    /// Inner node statistics keyed by flavor capacity (4, 16, 48, 256).
    pub node_stats: HashMap<usize, NodeStats>,
    pub num_leaves: usize,
    pub num_inner_nodes: usize,
    pub total_density: f64,
    pub max_height: usize,
}

impl TreeStats {
    pub(crate) fn record_inner(&mut self, width: usize, children: usize) {
        self.node_stats
            .entry(width)
            .and_modify(|e| {
                e.total_nodes += 1;
                e.total_children += children;
            })
            .or_insert(NodeStats {
                width,
                total_nodes: 1,
                total_children: children,
                density: 0.0,
            });
    }

    pub(crate) fn finish(&mut self) {
        let mut total_children = 0;
        let mut total_width = 0;
        for ns in self.node_stats.values_mut() {
            total_children += ns.total_children;
            total_width += ns.width * ns.total_nodes;
            ns.density = ns.total_children as f64 / (ns.width * ns.total_nodes) as f64;
        }
        self.num_inner_nodes = self.node_stats.values().map(|ns| ns.total_nodes).sum();
        self.total_density = if total_width == 0 {
            0.0
        } else {
            total_children as f64 / total_width as f64
        };
    }
}
