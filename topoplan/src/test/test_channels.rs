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

//! Tests for the level-ordered channel, bandwidth and EIRP assignment.

use super::fixtures::*;
use crate::channels::ChannelAssigner;
use crate::config::PlannerConfig;
use crate::mesh::{Band, BandTable, BandwidthTable, Mesh, Node, PlannedNode};
use crate::tree::TreeBuilder;
use crate::Error;

use assert_approx_eq::assert_approx_eq;
use std::collections::BTreeMap;

/// A node that only supports the upper band, with the given 160 MHz and
/// 80 MHz channel lists (EIRP caps 30.0 at 160 MHz, 27.0 and 27.5 at 80 MHz).
fn high_only_node(load: f64, bw160: Vec<u16>, bw80: Vec<u16>) -> Node {
    let eirp160 = vec![30.0; bw160.len()];
    let eirp80: Vec<f64> = (0..bw80.len()).map(|i| 27.0 + 0.5 * i as f64).collect();
    Node {
        gps: (47.4, 8.5),
        load,
        channels: BandTable {
            high: BandwidthTable { bw160, bw80, ..Default::default() },
            low: BandwidthTable::default(),
        },
        max_eirp: BandTable {
            high: BandwidthTable { bw160: eirp160, bw80: eirp80, ..Default::default() },
            low: BandwidthTable::default(),
        },
    }
}

fn plan_mesh(mesh: &Mesh, config: &PlannerConfig) -> BTreeMap<String, PlannedNode> {
    let mut tree = TreeBuilder::new(mesh, config).build().expect("tree must build");
    ChannelAssigner::new(mesh, config).assign(&mut tree).expect("assignment must succeed");
    tree
}

/// Check the radio invariants: exactly one radio per non-root node, at most
/// one per band on the root, and aligned list lengths everywhere.
fn check_radios(tree: &BTreeMap<String, PlannedNode>) {
    for (id, node) in tree {
        assert_eq!(node.channel.len(), node.bandwidth.len(), "misaligned lists on {}", id);
        assert_eq!(node.channel.len(), node.max_eirp.len(), "misaligned lists on {}", id);
        if node.is_root() {
            assert!(node.channel.len() <= 2, "too many root radios on {}", id);
        } else {
            assert_eq!(node.channel.len(), 1, "exactly one radio expected on {}", id);
        }
    }
}

#[test]
fn single_node_gets_both_root_radios() {
    let mesh = mesh(vec![("SN0", node(1.0))], vec![]);
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    assert_eq!(tree["SN0"].channel, vec![111, 15]);
    assert_eq!(tree["SN0"].bandwidth, vec![160, 160]);
    assert_approx_eq!(tree["SN0"].max_eirp[0], 30.0);
    assert_approx_eq!(tree["SN0"].max_eirp[1], 24.0);
    check_radios(&tree);
}

#[test]
fn root_band_without_160m_is_skipped() {
    let mesh = mesh(vec![("SN0", high_only_node(1.0, vec![111], vec![103]))], vec![]);
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    assert_eq!(tree["SN0"].channel, vec![111]);
    assert_eq!(tree["SN0"].bandwidth, vec![160]);
    check_radios(&tree);
}

#[test]
fn child_picks_first_free_wide_channel() {
    let mesh = mesh(
        vec![("SN0", node(10.0)), ("SN1", node(5.0))],
        vec![("SN0", "SN1", strong_edge())],
    );
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    // the root holds 111 and 15; 127 is the first surviving 160M channel
    assert_eq!(tree["SN1"].channel, vec![127]);
    assert_eq!(tree["SN1"].bandwidth, vec![160]);
    assert_approx_eq!(tree["SN1"].max_eirp[0], 30.0);
    check_radios(&tree);
}

#[test]
fn conflicting_siblings_get_disjoint_channels() {
    let mesh = mesh(
        vec![("SN0", node(10.0)), ("SN1", node(5.0)), ("SN2", node(3.0))],
        vec![
            ("SN0", "SN1", strong_edge()),
            ("SN0", "SN2", strong_edge()),
            ("SN1", "SN2", conflict_edge()),
        ],
    );
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    // SN1 picks first (higher load), SN2 must avoid 111, 15 and 127
    assert_eq!(tree["SN1"].channel, vec![127]);
    assert_eq!(tree["SN2"].channel, vec![143]);
    check_radios(&tree);
}

#[test]
fn non_conflicting_siblings_may_share_a_channel() {
    let mesh = mesh(
        vec![("SN0", node(10.0)), ("SN1", node(5.0)), ("SN2", node(3.0))],
        vec![("SN0", "SN1", strong_edge()), ("SN0", "SN2", strong_edge())],
    );
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    // without a measured link between them the siblings do not conflict
    assert_eq!(tree["SN1"].channel, vec![127]);
    assert_eq!(tree["SN2"].channel, vec![127]);
    check_radios(&tree);
}

#[test]
fn load_decides_the_pick_order() {
    let mesh = mesh(
        vec![("SN0", node(10.0)), ("SN1", node(5.0)), ("SN2", node(50.0))],
        vec![
            ("SN0", "SN1", strong_edge()),
            ("SN0", "SN2", strong_edge()),
            ("SN1", "SN2", conflict_edge()),
        ],
    );
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    // SN2 outranks SN1 inside the level and takes the better channel
    assert_eq!(tree["SN2"].channel, vec![127]);
    assert_eq!(tree["SN1"].channel, vec![143]);
    check_radios(&tree);
}

#[test]
fn exhausted_width_backs_off_to_narrower() {
    let mesh = mesh(
        vec![
            ("SN0", node(10.0)),
            ("SN1", high_only_node(5.0, vec![111], vec![103, 119])),
        ],
        vec![("SN0", "SN1", strong_edge())],
    );
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    // the only 160M channel of SN1 is held by the root, 80M still has room
    assert_eq!(tree["SN1"].channel, vec![103]);
    assert_eq!(tree["SN1"].bandwidth, vec![80]);
    assert_approx_eq!(tree["SN1"].max_eirp[0], 27.0);
    check_radios(&tree);
}

#[test]
fn eirp_is_indexed_into_the_unfiltered_list() {
    let root = high_only_node(10.0, vec![103], vec![151]);
    let mesh = mesh(
        vec![("SN0", root), ("SN1", high_only_node(5.0, vec![103], vec![103, 119]))],
        vec![("SN0", "SN1", strong_edge())],
    );
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    // 103 is pruned at both widths, so SN1 lands on the second 80M channel
    // and must take the EIRP at index 1, not index 0
    assert_eq!(tree["SN1"].channel, vec![119]);
    assert_eq!(tree["SN1"].bandwidth, vec![80]);
    assert_approx_eq!(tree["SN1"].max_eirp[0], 27.5);
    check_radios(&tree);
}

#[test]
fn deeper_level_switches_to_the_lower_band() {
    let mesh = mesh(
        vec![("SN0", node(10.0)), ("SN1", node(5.0)), ("SN2", node(3.0))],
        vec![("SN0", "SN1", strong_edge()), ("SN1", "SN2", strong_edge())],
    );
    let tree = plan_mesh(&mesh, &PlannerConfig::default());

    // SN2 hangs below a level-1 parent, so it operates on 6GL; the root's
    // low radio (channel 15) is not in its conflict set
    assert_eq!(tree["SN2"].backhaul_band, Some(Band::Low));
    assert_eq!(tree["SN2"].channel, vec![15]);
    check_radios(&tree);
}

#[test]
fn no_surviving_channel_reports_the_conflict() {
    let mesh = mesh(
        vec![
            ("SN0", high_only_node(10.0, vec![111], vec![])),
            ("SN1", high_only_node(5.0, vec![111], vec![])),
        ],
        vec![("SN0", "SN1", strong_edge())],
    );
    let config = PlannerConfig::default();
    let mut tree = TreeBuilder::new(&mesh, &config).build().expect("tree must build");
    let result = ChannelAssigner::new(&mesh, &config).assign(&mut tree);

    match result {
        Err(Error::ChannelAssignment {
            node_id,
            band,
            attempted_channels,
            conflict_nodes,
            ..
        }) => {
            assert_eq!(node_id.as_deref(), Some("SN1"));
            assert_eq!(band, Some(Band::High));
            assert_eq!(attempted_channels, vec![111]);
            assert_eq!(conflict_nodes, vec!["SN0".to_string()]);
        }
        other => panic!("expected a channel assignment error, got {:?}", other),
    }
}

#[test]
fn skeleton_without_root_is_rejected() {
    let mesh = mesh(vec![("SN0", node(1.0))], vec![]);
    let mut tree: BTreeMap<String, PlannedNode> = BTreeMap::new();
    tree.insert("SN0".to_string(), PlannedNode::child("SN1", Band::High, 1));

    let config = PlannerConfig::default();
    let result = ChannelAssigner::new(&mesh, &config).assign(&mut tree);
    assert!(matches!(result, Err(Error::ChannelAssignment { .. })));
}

#[test]
fn skeleton_without_backhaul_band_is_rejected() {
    let mesh = mesh(
        vec![("SN0", node(1.0)), ("SN1", node(1.0))],
        vec![("SN0", "SN1", strong_edge())],
    );
    let mut tree: BTreeMap<String, PlannedNode> = BTreeMap::new();
    tree.insert("SN0".to_string(), PlannedNode::root());
    let mut broken = PlannedNode::child("SN0", Band::High, 1);
    broken.backhaul_band = None;
    tree.insert("SN1".to_string(), broken);

    let config = PlannerConfig::default();
    let result = ChannelAssigner::new(&mesh, &config).assign(&mut tree);
    assert!(matches!(result, Err(Error::ChannelAssignment { .. })));
}
