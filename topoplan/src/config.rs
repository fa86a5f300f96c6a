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

//! Numeric knobs of a planning run.

use serde::Deserialize;

/// Configuration of a planning run. Decoded strictly from the (optional)
/// config payload: any unknown field is rejected, any omitted field takes its
/// default. The wire names are the upper-case forms given in the rename
/// attributes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Maximum number of children below a single parent.
    #[serde(rename = "MAX_DEGREE", default = "default_max_degree")]
    pub max_degree: usize,

    /// Minimum link RSSI (dBm) for an edge to be admissible in the tree.
    #[serde(rename = "RSSI_THRESHOLD", default = "default_rssi_threshold")]
    pub rssi_threshold: i16,

    /// Maximum tree depth; a node at this level cannot attach children.
    #[serde(rename = "MAX_HOP", default = "default_max_hop")]
    pub max_hop: usize,

    /// Coefficient on the predicted link throughput in the edge weight.
    #[serde(rename = "THROUGHPUT_WEIGHT", default = "default_throughput_weight")]
    pub throughput_weight: f64,

    /// Coefficient on the combined endpoint load in the edge weight.
    #[serde(rename = "LOAD_WEIGHT", default = "default_load_weight")]
    pub load_weight: f64,

    /// Coefficient on the parent level in the edge weight. Negative, so that
    /// shallow attachment is preferred.
    #[serde(rename = "HOP_WEIGHT", default = "default_hop_weight")]
    pub hop_weight: f64,

    /// Two nodes hearing each other at or above this RSSI (dBm) must not
    /// share an operating channel.
    #[serde(rename = "RSSI_CONFLICT_THRESHOLD", default = "default_rssi_conflict_threshold")]
    pub rssi_conflict_threshold: i16,

    /// Root override. When unset, the lexicographically smallest node id
    /// becomes the root.
    #[serde(rename = "ROOT", default)]
    pub root: Option<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_degree: default_max_degree(),
            rssi_threshold: default_rssi_threshold(),
            max_hop: default_max_hop(),
            throughput_weight: default_throughput_weight(),
            load_weight: default_load_weight(),
            hop_weight: default_hop_weight(),
            rssi_conflict_threshold: default_rssi_conflict_threshold(),
            root: None,
        }
    }
}

fn default_max_degree() -> usize {
    3
}

fn default_rssi_threshold() -> i16 {
    -72
}

fn default_max_hop() -> usize {
    5
}

fn default_throughput_weight() -> f64 {
    1.0
}

fn default_load_weight() -> f64 {
    0.5
}

fn default_hop_weight() -> f64 {
    -80.0
}

fn default_rssi_conflict_threshold() -> i16 {
    -85
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_degree, 3);
        assert_eq!(config.rssi_threshold, -72);
        assert_eq!(config.max_hop, 5);
        assert_eq!(config.throughput_weight, 1.0);
        assert_eq!(config.load_weight, 0.5);
        assert_eq!(config.hop_weight, -80.0);
        assert_eq!(config.rssi_conflict_threshold, -85);
        assert_eq!(config.root, None);
    }

    #[test]
    fn empty_payload_yields_defaults() {
        let config: PlannerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn partial_override() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"MAX_DEGREE": 2, "RSSI_THRESHOLD": -80}"#).unwrap();
        assert_eq!(config.max_degree, 2);
        assert_eq!(config.rssi_threshold, -80);
        assert_eq!(config.max_hop, 5);
    }

    #[test]
    fn root_override() {
        let config: PlannerConfig = serde_json::from_str(r#"{"ROOT": "SN3"}"#).unwrap();
        assert_eq!(config.root.as_deref(), Some("SN3"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(serde_json::from_str::<PlannerConfig>(r#"{"MAX_DEGREES": 2}"#).is_err());
    }
}
