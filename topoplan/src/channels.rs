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

//! # The Channel Assigner
//!
//! Completes the tree skeleton with operating channels, widths and transmit
//! power caps.
//!
//! The root gets up to one radio per band, always at 160 MHz (a band without
//! a 160 MHz channel is skipped). Every other node gets exactly one radio on
//! the band of its backhaul link, processed level by level so that parents
//! are assigned before their children, and inside a level in order of
//! descending load, so that busy nodes pick while wide channels are still
//! free. A node must not reuse any channel already held by a *conflicting*
//! neighbor (one it hears at or above the conflict threshold, on any band);
//! when every channel of a width is taken, the node backs off to the next
//! narrower width, down to 20 MHz.

use crate::config::PlannerConfig;
use crate::mesh::{Band, Bandwidth, Mesh, MeshNodeId, PlannedNode};
use crate::Error;

use itertools::Itertools;
use log::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// # The Channel Assigner
///
/// Mutates the [`PlannedNode`] map produced by the tree builder until every
/// attached node carries its channel, bandwidth and EIRP lists. See the
/// [module documentation](self) for the strategy.
#[derive(Debug)]
pub struct ChannelAssigner<'a> {
    mesh: &'a Mesh,
    config: &'a PlannerConfig,
}

impl<'a> ChannelAssigner<'a> {
    /// Prepare an assigner for the given mesh and configuration.
    pub fn new(mesh: &'a Mesh, config: &'a PlannerConfig) -> Self {
        Self { mesh, config }
    }

    /// Assign channels to every node of the tree, in place.
    pub fn assign(&self, tree: &mut BTreeMap<String, PlannedNode>) -> Result<(), Error> {
        let root_id = tree
            .iter()
            .find(|(_, planned)| planned.is_root())
            .map(|(id, _)| id.clone())
            .ok_or_else(|| Error::ChannelAssignment {
                message: "the tree has no root".to_string(),
                node_id: None,
                band: None,
                attempted_channels: Vec::new(),
                conflict_nodes: Vec::new(),
            })?;

        self.assign_root(&root_id, tree)?;

        // group the remaining nodes by level; BTreeMap keeps the levels
        // ascending so parents are always assigned before their children
        let mut levels: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (id, planned) in tree.iter() {
            if !planned.is_root() {
                levels.entry(planned.level).or_default().push(id.clone());
            }
        }

        for (level, ids) in levels {
            for id in self.order_by_load(ids) {
                trace!("assigning node {} at level {}", id, level);
                self.assign_node(&id, tree)?;
            }
        }

        Ok(())
    }

    /// Give the root one 160 MHz radio per band that supports it.
    fn assign_root(
        &self,
        root_id: &str,
        tree: &mut BTreeMap<String, PlannedNode>,
    ) -> Result<(), Error> {
        let idx = self.node_index(root_id)?;
        let info = self.mesh.info(idx);

        let planned = tree.get_mut(root_id).ok_or_else(|| Error::ChannelAssignment {
            message: "the root is not part of the tree".to_string(),
            node_id: Some(root_id.to_string()),
            band: None,
            attempted_channels: Vec::new(),
            conflict_nodes: Vec::new(),
        })?;

        for &band in &Band::ALL {
            let channels = info.channels.get(band, Bandwidth::Mhz160);
            let caps = info.max_eirp.get(band, Bandwidth::Mhz160);
            match (channels.first(), caps.first()) {
                (Some(&channel), Some(&eirp)) => {
                    planned.channel.push(channel);
                    planned.bandwidth.push(Bandwidth::Mhz160.mhz());
                    planned.max_eirp.push(eirp);
                    debug!("root {} radio on {}: channel {} at 160M", root_id, band, channel);
                }
                _ => debug!("root {} has no 160M channel on {}, band skipped", root_id, band),
            }
        }

        if planned.channel.is_empty() {
            warn!("root {} supports 160M on neither band and got no radio", root_id);
        }

        Ok(())
    }

    /// Assign one radio to a non-root node, backing off from wide to narrow
    /// widths until a channel survives the conflict pruning.
    fn assign_node(&self, id: &str, tree: &mut BTreeMap<String, PlannedNode>) -> Result<(), Error> {
        let band = self.backhaul_band(id, tree)?;
        let idx = self.node_index(id)?;
        let info = self.mesh.info(idx);

        let conflicts = self.conflict_nodes(idx);
        let used = self.used_channels(&conflicts, tree);

        let mut attempted: Vec<u16> = Vec::new();
        for &bw in &Bandwidth::DESCENDING {
            if self.try_width(id, band, bw, &used, tree)? {
                return Ok(());
            }
            let declared = info.channels.get(band, bw);
            let new_channels: Vec<u16> = declared.iter().copied().filter(|ch| !attempted.contains(ch)).collect();
            attempted.extend(new_channels);
        }

        // minimum-bandwidth retry: one more pass over the 20 MHz table
        // before the node is declared unassignable
        warn!("node {} found no free channel at any width on {}, retrying at 20M", id, band);
        if self.try_width(id, band, Bandwidth::Mhz20, &used, tree)? {
            return Ok(());
        }

        Err(Error::ChannelAssignment {
            message: "no channel survives the conflict pruning at any width".to_string(),
            node_id: Some(id.to_string()),
            band: Some(band),
            attempted_channels: attempted,
            conflict_nodes: self.conflict_ids(&conflicts),
        })
    }

    /// Try to assign the first declared channel of the given width that is
    /// not in `used`. Returns whether a radio was assigned.
    fn try_width(
        &self,
        id: &str,
        band: Band,
        bw: Bandwidth,
        used: &BTreeSet<u16>,
        tree: &mut BTreeMap<String, PlannedNode>,
    ) -> Result<bool, Error> {
        let idx = self.node_index(id)?;
        let info = self.mesh.info(idx);
        let declared = info.channels.get(band, bw);
        let i = match declared.iter().position(|ch| !used.contains(ch)) {
            Some(i) => i,
            None => return Ok(false),
        };
        let channel = declared[i];
        // EIRP is looked up by position in the unfiltered channel list
        let eirp = info.max_eirp.get(band, bw).get(i).copied().ok_or_else(|| {
            Error::ChannelAssignment {
                message: "EIRP table does not cover the chosen channel".to_string(),
                node_id: Some(id.to_string()),
                band: Some(band),
                attempted_channels: vec![channel],
                conflict_nodes: Vec::new(),
            }
        })?;
        if bw != Bandwidth::Mhz160 {
            debug!("node {} degraded to {} on {}", id, bw, band);
        }
        let planned = tree.get_mut(id).ok_or_else(|| missing_from_tree(id, Some(band)))?;
        planned.channel.push(channel);
        planned.bandwidth.push(bw.mhz());
        planned.max_eirp.push(eirp);
        debug!("node {} assigned channel {} at {} on {}", id, channel, bw, band);
        Ok(true)
    }

    /// The band a non-root node is locked to by its backhaul link.
    fn backhaul_band(
        &self,
        id: &str,
        tree: &BTreeMap<String, PlannedNode>,
    ) -> Result<Band, Error> {
        let planned = tree.get(id).ok_or_else(|| missing_from_tree(id, None))?;
        if planned.parent.is_none() {
            return Err(Error::ChannelAssignment {
                message: "non-root node carries no parent".to_string(),
                node_id: Some(id.to_string()),
                band: None,
                attempted_channels: Vec::new(),
                conflict_nodes: Vec::new(),
            });
        }
        planned.backhaul_band.ok_or_else(|| Error::ChannelAssignment {
            message: "non-root node carries no backhaul band".to_string(),
            node_id: Some(id.to_string()),
            band: None,
            attempted_channels: Vec::new(),
            conflict_nodes: Vec::new(),
        })
    }

    /// All neighbors the node hears at or above the conflict threshold, on
    /// any band. Sorted by index for deterministic error payloads.
    fn conflict_nodes(&self, idx: MeshNodeId) -> Vec<MeshNodeId> {
        self.mesh
            .neighbors(idx)
            .filter(|(_, edge)| edge.best_rssi() >= self.config.rssi_conflict_threshold)
            .map(|(m, _)| m)
            .sorted()
            .collect()
    }

    /// The union of all channels already held by the given nodes. Channel
    /// numbers are compared across bands; the pools do not overlap, so this
    /// is equivalent to a per-band comparison.
    fn used_channels(
        &self,
        conflicts: &[MeshNodeId],
        tree: &BTreeMap<String, PlannedNode>,
    ) -> BTreeSet<u16> {
        conflicts
            .iter()
            .filter_map(|m| tree.get(self.mesh.id(*m)))
            .flat_map(|planned| planned.channel.iter().copied())
            .collect()
    }

    fn conflict_ids(&self, conflicts: &[MeshNodeId]) -> Vec<String> {
        conflicts.iter().map(|m| self.mesh.id(*m).to_string()).collect()
    }

    fn node_index(&self, id: &str) -> Result<MeshNodeId, Error> {
        self.mesh.lookup(id).ok_or_else(|| Error::ChannelAssignment {
            message: "planned node is not part of the mesh".to_string(),
            node_id: Some(id.to_string()),
            band: None,
            attempted_channels: Vec::new(),
            conflict_nodes: Vec::new(),
        })
    }

    /// Order the ids of one level by descending load, ties by id. The sort
    /// is stable, so equal `(load, id)` pairs keep their input order.
    fn order_by_load(&self, mut ids: Vec<String>) -> Vec<String> {
        ids.sort_by(|a, b| {
            let load_a = self.mesh.lookup(a).map(|i| self.mesh.info(i).load).unwrap_or(0.0);
            let load_b = self.mesh.lookup(b).map(|i| self.mesh.info(i).load).unwrap_or(0.0);
            load_b
                .partial_cmp(&load_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
        ids
    }
}

fn missing_from_tree(id: &str, band: Option<Band>) -> Error {
    Error::ChannelAssignment {
        message: "planned node disappeared from the tree".to_string(),
        node_id: Some(id.to_string()),
        band,
        attempted_channels: Vec::new(),
        conflict_nodes: Vec::new(),
    }
}
