// Topoplan: Planning Backhaul Topologies for 6 GHz Wireless Mesh Networks
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # The Tree Builder
//!
//! Builds the rooted backhaul tree over the mesh: a Prim-style greedy that
//! repeatedly attaches the unattached node with the heaviest admissible edge
//! into the tree built so far.
//!
//! An edge (parent `p` in the tree, child `c` outside) is *admissible* iff a
//! measured link between the two exists, its strongest RSSI sample reaches
//! the configured threshold, `p` still has a free child slot, and `p` is not
//! at the hop cap. Among admissible edges, the weight
//!
//! ```text
//! weight = THROUGHPUT_WEIGHT * throughput(rssi*)
//!        + LOAD_WEIGHT * (load(p) + load(c))
//!        + HOP_WEIGHT * level(p)
//! ```
//!
//! decides (higher is better); equal weights resolve to the smallest
//! `(parent id, child id)` pair so that the result only depends on the
//! input. Children alternate the backhaul band by the parity of the parent
//! level.
//!
//! Nodes that cannot be attached are reported with a warning and left out of
//! the returned tree; the caller decides whether a partial tree is
//! acceptable.

use crate::config::PlannerConfig;
use crate::mesh::{Band, Edge, Mesh, MeshNodeId, PlannedNode};
use crate::Error;

use log::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// # The Tree Builder
///
/// Computes the tree skeleton (parent, level and backhaul band per node;
/// channels stay empty) for one planning run. See the [module
/// documentation](self) for the algorithm.
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    mesh: &'a Mesh,
    config: &'a PlannerConfig,
}

impl<'a> TreeBuilder<'a> {
    /// Prepare a builder for the given mesh and configuration.
    pub fn new(mesh: &'a Mesh, config: &'a PlannerConfig) -> Self {
        Self { mesh, config }
    }

    /// Build the tree skeleton. Fails with [`Error::TopologyGeneration`] on
    /// an empty mesh, an unknown root override, or when the iteration cap is
    /// exceeded (which would indicate a bug in the expansion itself).
    pub fn build(&self) -> Result<BTreeMap<String, PlannedNode>, Error> {
        if self.mesh.is_empty() {
            return Err(Error::TopologyGeneration("the node set is empty".to_string()));
        }

        let root = self.root_node()?;
        debug!("expanding the tree from root {}", self.mesh.id(root));

        let mut tree: BTreeMap<String, PlannedNode> = BTreeMap::new();
        tree.insert(self.mesh.id(root).to_string(), PlannedNode::root());

        // levels and child counts are kept per graph index; the tree map
        // itself is keyed by id for the caller
        let mut levels: HashMap<MeshNodeId, usize> = HashMap::new();
        levels.insert(root, 0);
        let mut children: HashMap<MeshNodeId, usize> = HashMap::new();

        let mut selected: BTreeSet<MeshNodeId> = BTreeSet::new();
        selected.insert(root);
        let mut unselected: BTreeSet<MeshNodeId> =
            self.mesh.indices().filter(|idx| *idx != root).collect();

        let mut iterations = 0;
        let iteration_cap = 2 * self.mesh.len();

        while !unselected.is_empty() {
            if iterations >= iteration_cap {
                return Err(Error::TopologyGeneration(format!(
                    "tree expansion did not terminate within {} iterations",
                    iteration_cap
                )));
            }
            iterations += 1;

            let (parent, child, weight) =
                match self.best_edge(&selected, &unselected, &levels, &children) {
                    Some(best) => best,
                    None => break,
                };

            let parent_level = *levels.get(&parent).unwrap_or(&0);
            let band = Band::for_parent_level(parent_level);
            debug!(
                "attach {} below {} (weight {:.1}, level {}, band {})",
                self.mesh.id(child),
                self.mesh.id(parent),
                weight,
                parent_level + 1,
                band
            );

            tree.insert(
                self.mesh.id(child).to_string(),
                PlannedNode::child(self.mesh.id(parent), band, parent_level + 1),
            );
            levels.insert(child, parent_level + 1);
            *children.entry(parent).or_insert(0) += 1;
            selected.insert(child);
            unselected.remove(&child);
        }

        if !unselected.is_empty() {
            let stranded: Vec<&str> =
                unselected.iter().map(|idx| self.mesh.id(*idx)).collect();
            warn!(
                "no admissible edge left, {} nodes stay unattached: {:?}",
                stranded.len(),
                stranded
            );
        }

        Ok(tree)
    }

    /// The root of the tree: the configured override if set, the smallest
    /// node id otherwise.
    fn root_node(&self) -> Result<MeshNodeId, Error> {
        match &self.config.root {
            Some(id) => self.mesh.lookup(id).ok_or_else(|| {
                Error::TopologyGeneration(format!(
                    "the configured root {} does not name a node",
                    id
                ))
            }),
            None => self
                .mesh
                .indices()
                .next()
                .ok_or_else(|| Error::TopologyGeneration("the node set is empty".to_string())),
        }
    }

    /// Scan all admissible (parent, child) pairs and return the heaviest,
    /// or `None` when nothing is admissible anymore. Parents and children
    /// are visited in sorted-id order and the running best is only replaced
    /// on strictly greater weight, which makes the tie-break deterministic.
    fn best_edge(
        &self,
        selected: &BTreeSet<MeshNodeId>,
        unselected: &BTreeSet<MeshNodeId>,
        levels: &HashMap<MeshNodeId, usize>,
        children: &HashMap<MeshNodeId, usize>,
    ) -> Option<(MeshNodeId, MeshNodeId, f64)> {
        let mut best: Option<(MeshNodeId, MeshNodeId, f64)> = None;

        for &parent in selected {
            let parent_level = *levels.get(&parent).unwrap_or(&0);
            if *children.get(&parent).unwrap_or(&0) >= self.config.max_degree {
                continue;
            }
            if parent_level >= self.config.max_hop {
                continue;
            }
            for &child in unselected {
                let edge = match self.mesh.edge_between(parent, child) {
                    Some(edge) => edge,
                    None => continue,
                };
                if edge.best_rssi() < self.config.rssi_threshold {
                    continue;
                }
                let weight = self.edge_weight(parent, child, edge, parent_level);
                trace!(
                    "candidate {} -> {}: weight {:.1}",
                    self.mesh.id(parent),
                    self.mesh.id(child),
                    weight
                );
                if best.map_or(true, |(_, _, w)| weight > w) {
                    best = Some((parent, child, weight));
                }
            }
        }

        best
    }

    fn edge_weight(
        &self,
        parent: MeshNodeId,
        child: MeshNodeId,
        edge: &Edge,
        parent_level: usize,
    ) -> f64 {
        let throughput = predicted_throughput(edge.best_rssi());
        let total_load = self.mesh.info(parent).load + self.mesh.info(child).load;
        self.config.throughput_weight * throughput
            + self.config.load_weight * total_load
            + self.config.hop_weight * parent_level as f64
    }
}

/// Linear throughput prediction from the strongest RSSI sample of a link
/// (e.g. -70 dBm predicts 300 Mbps).
fn predicted_throughput(rssi: i16) -> f64 {
    ((f64::from(rssi) + 100.0) * 10.0).max(0.0)
}
