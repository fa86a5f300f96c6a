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

//! Shared builders for the planner tests.

use crate::mesh::{BandTable, BandwidthTable, Edge, Mesh, MeshLink, Node};

use std::collections::BTreeMap;

/// A node with a full channel complement on both bands.
pub fn node(load: f64) -> Node {
    Node {
        gps: (47.4, 8.5),
        load,
        channels: BandTable {
            high: BandwidthTable {
                bw160: vec![111, 127, 143],
                bw80: vec![103, 119],
                bw40: vec![101, 109],
                bw20: vec![105, 113],
            },
            low: BandwidthTable {
                bw160: vec![15, 47, 79],
                bw80: vec![7, 23],
                bw40: vec![3, 11],
                bw20: vec![1, 5],
            },
        },
        max_eirp: BandTable {
            high: BandwidthTable {
                bw160: vec![30.0, 30.0, 33.0],
                bw80: vec![27.0, 27.0],
                bw40: vec![24.0, 24.0],
                bw20: vec![21.0, 21.0],
            },
            low: BandwidthTable {
                bw160: vec![24.0, 24.0, 27.0],
                bw80: vec![21.0, 21.0],
                bw40: vec![18.0, 18.0],
                bw20: vec![15.0, 15.0],
            },
        },
    }
}

/// A link that is both tree-admissible and a channel conflict (best sample
/// -55 dBm).
pub fn strong_edge() -> Edge {
    Edge { rssi_6gh: (-60, -62), rssi_6gl: (-55, -57) }
}

/// A link below the tree admission threshold but above the conflict
/// threshold (best sample -75 dBm).
pub fn below_threshold_edge() -> Edge {
    Edge { rssi_6gh: (-80, -82), rssi_6gl: (-75, -77) }
}

/// A link that only matters for conflicts (best sample -80 dBm).
pub fn conflict_edge() -> Edge {
    Edge { rssi_6gh: (-84, -84), rssi_6gl: (-80, -80) }
}

/// Build a mesh from `(id, node)` pairs and `(a, b, edge)` links.
pub fn mesh(nodes: Vec<(&str, Node)>, links: Vec<(&str, &str, Edge)>) -> Mesh {
    let nodes: BTreeMap<String, Node> =
        nodes.into_iter().map(|(id, n)| (id.to_string(), n)).collect();
    let links = links
        .into_iter()
        .map(|(a, b, edge)| MeshLink { a: a.to_string(), b: b.to_string(), edge })
        .collect();
    Mesh::new(nodes, links).expect("the fixture mesh must be valid")
}
