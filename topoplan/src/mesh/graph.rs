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

//! The measured mesh as an undirected graph.

use super::types::{Edge, Node};
use crate::Error;

use petgraph::prelude::*;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

/// Identifier of a node inside the mesh graph (index into the graph).
pub type MeshNodeId = NodeIndex<u32>;

/// A link decoded from the edges payload, still keyed by its endpoint ids.
/// The pair is unordered: `a` and `b` carry no orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshLink {
    /// First endpoint as written in the edge key.
    pub a: String,
    /// Second endpoint as written in the edge key.
    pub b: String,
    /// The RSSI measurements of the link.
    pub edge: Edge,
}

/// # The measured mesh
///
/// Holds the candidate nodes and the measured links between them as an
/// undirected [`petgraph`] graph, together with an id lookup. Nodes are
/// inserted in sorted-id order, so the graph index order (and with it every
/// index-ordered iteration of the planner) is deterministic for a given
/// input.
#[derive(Debug, Clone)]
pub struct Mesh {
    graph: Graph<MeshNode, Edge, Undirected, u32>,
    index: HashMap<String, MeshNodeId>,
}

#[derive(Debug, Clone)]
struct MeshNode {
    id: String,
    info: Node,
}

impl Mesh {
    /// Build the mesh from decoded nodes and links. The endpoints of every
    /// link must name nodes of the map, and no unordered pair may appear
    /// twice; both conditions are already guaranteed by the input validator,
    /// but violating them here is reported as a [`Error::Validation`] as
    /// well.
    pub fn new(nodes: BTreeMap<String, Node>, links: Vec<MeshLink>) -> Result<Self, Error> {
        let mut graph = Graph::new_undirected();
        let mut index = HashMap::with_capacity(nodes.len());

        for (id, info) in nodes {
            let idx = graph.add_node(MeshNode { id: id.clone(), info });
            index.insert(id, idx);
        }

        for link in links {
            let a = *index.get(&link.a).ok_or_else(|| unknown_endpoint(&link.a, &link.b))?;
            let b = *index.get(&link.b).ok_or_else(|| unknown_endpoint(&link.b, &link.a))?;
            if graph.find_edge(a, b).is_some() {
                return Err(Error::validation(
                    "edge_key",
                    "duplicate link between the same pair of nodes",
                    json!(format!("{}_{}", link.a, link.b)),
                    json!({ "unordered_pair_unique": true }),
                ));
            }
            graph.add_edge(a, b, link.edge);
        }

        Ok(Self { graph, index })
    }

    /// Number of nodes in the mesh.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the mesh has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterator over all node indices, in sorted-id order.
    pub fn indices(&self) -> impl Iterator<Item = MeshNodeId> {
        self.graph.node_indices()
    }

    /// The id of a node.
    pub fn id(&self, idx: MeshNodeId) -> &str {
        &self.graph[idx].id
    }

    /// The input record of a node.
    pub fn info(&self, idx: MeshNodeId) -> &Node {
        &self.graph[idx].info
    }

    /// Looks up a node index by id.
    pub fn lookup(&self, id: &str) -> Option<MeshNodeId> {
        self.index.get(id).copied()
    }

    /// The measured link between two nodes, in either orientation.
    pub fn edge_between(&self, a: MeshNodeId, b: MeshNodeId) -> Option<&Edge> {
        self.graph.find_edge(a, b).and_then(|e| self.graph.edge_weight(e))
    }

    /// Iterator over the neighbors of a node together with the connecting
    /// link. The iteration order is not specified; callers must not depend
    /// on it.
    pub fn neighbors(&self, n: MeshNodeId) -> impl Iterator<Item = (MeshNodeId, &Edge)> + '_ {
        self.graph.edges(n).map(move |e| {
            let m = if e.source() == n { e.target() } else { e.source() };
            (m, e.weight())
        })
    }
}

fn unknown_endpoint(missing: &str, other: &str) -> Error {
    Error::validation(
        "edge_key",
        "edge endpoint does not name a known node",
        json!(format!("{}_{}", missing, other)),
        json!({ "endpoints_must_exist": true }),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::btreemap;

    fn node() -> Node {
        Node {
            gps: (47.4, 8.5),
            load: 1.0,
            channels: Default::default(),
            max_eirp: Default::default(),
        }
    }

    fn link(a: &str, b: &str) -> MeshLink {
        MeshLink {
            a: a.to_string(),
            b: b.to_string(),
            edge: Edge { rssi_6gh: (-60, -60), rssi_6gl: (-55, -55) },
        }
    }

    #[test]
    fn indices_follow_sorted_ids() {
        let mesh = Mesh::new(
            btreemap! {
                "SN2".to_string() => node(),
                "SN0".to_string() => node(),
                "SN1".to_string() => node(),
            },
            vec![],
        )
        .unwrap();
        let ids: Vec<&str> = mesh.indices().map(|i| mesh.id(i)).collect();
        assert_eq!(ids, vec!["SN0", "SN1", "SN2"]);
    }

    #[test]
    fn edge_lookup_is_orientation_free() {
        let mesh = Mesh::new(
            btreemap! {
                "SN0".to_string() => node(),
                "SN1".to_string() => node(),
            },
            vec![link("SN1", "SN0")],
        )
        .unwrap();
        let a = mesh.lookup("SN0").unwrap();
        let b = mesh.lookup("SN1").unwrap();
        assert!(mesh.edge_between(a, b).is_some());
        assert!(mesh.edge_between(b, a).is_some());
    }

    #[test]
    fn duplicate_pair_is_rejected() {
        let result = Mesh::new(
            btreemap! {
                "SN0".to_string() => node(),
                "SN1".to_string() => node(),
            },
            vec![link("SN0", "SN1"), link("SN1", "SN0")],
        );
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let result =
            Mesh::new(btreemap! { "SN0".to_string() => node() }, vec![link("SN0", "SN9")]);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }
}
