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

//! Random mesh scenarios for smoke-testing the planner.

use rand::prelude::*;
use serde_json::{json, Map, Value};

/// Generate a random but valid `(nodes, edges)` payload pair with the given
/// number of nodes. The same seed always yields the same scenario.
///
/// Nodes sit on a jittered grid around Zurich; every node after the first is
/// linked to a random earlier node (so the mesh is connected), plus a few
/// extra cross links. RSSI falls off with the grid distance, staying inside
/// the admission rules of the planner (the lower band is always the stronger
/// one, both bands and both directions stay within their tolerances).
pub fn random_payloads(num_nodes: usize, seed: u64) -> (String, String) {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut positions: Vec<(f64, f64)> = Vec::with_capacity(num_nodes);
    let mut nodes = Map::new();
    for i in 0..num_nodes {
        let lat = 47.35 + 0.01 * (i / 4) as f64 + rng.gen_range(0.0, 0.002);
        let lon = 8.50 + 0.01 * (i % 4) as f64 + rng.gen_range(0.0, 0.002);
        positions.push((lat, lon));
        nodes.insert(format!("SN{}", i), node_payload(&mut rng, lat, lon));
    }

    let mut edges = Map::new();
    for i in 1..num_nodes {
        let j = rng.gen_range(0, i);
        edges.insert(format!("SN{}_SN{}", j, i), edge_payload(&mut rng, positions[j], positions[i]));
    }
    // a few cross links to give the channel assigner some conflicts
    for _ in 0..num_nodes / 2 {
        let i = rng.gen_range(0, num_nodes);
        let j = rng.gen_range(0, num_nodes);
        if i == j {
            continue;
        }
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        let key = format!("SN{}_SN{}", a, b);
        if !edges.contains_key(&key) {
            edges.insert(key, edge_payload(&mut rng, positions[a], positions[b]));
        }
    }

    (Value::Object(nodes).to_string(), Value::Object(edges).to_string())
}

fn node_payload(rng: &mut StdRng, lat: f64, lon: f64) -> Value {
    // every node supports the full lower band; the upper 160M complement is
    // drawn per node so that wide channels become scarce
    let high_160: Vec<u16> = [111u16, 127, 143, 159]
        .iter()
        .copied()
        .filter(|_| rng.gen_bool(0.75))
        .collect();
    let high_160_eirp = vec![30.0; high_160.len()];
    let load: f64 = (rng.gen_range(0.0, 50.0f64) * 10.0).round() / 10.0;

    json!({
        "gps": [(lat * 1e6).round() / 1e6, (lon * 1e6).round() / 1e6],
        "load": load,
        "channels": {
            "6GH": {
                "160M": high_160,
                "80M": [103, 119, 135],
                "40M": [101, 109, 117],
                "20M": [105, 113]
            },
            "6GL": {
                "160M": [15, 47, 79],
                "80M": [7, 23, 39],
                "40M": [3, 11, 19],
                "20M": [1, 5, 9]
            }
        },
        "maxEirp": {
            "6GH": {
                "160M": high_160_eirp,
                "80M": [27.0, 27.0, 27.0],
                "40M": [24.0, 24.0, 24.0],
                "20M": [21.0, 21.0]
            },
            "6GL": {
                "160M": [24.0, 24.0, 24.0],
                "80M": [21.0, 21.0, 21.0],
                "40M": [18.0, 18.0, 18.0],
                "20M": [15.0, 15.0, 15.0]
            }
        }
    })
}

fn edge_payload(rng: &mut StdRng, a: (f64, f64), b: (f64, f64)) -> Value {
    // roughly -50 dBm next door, 6 dB per grid step, clamped so that the
    // link never fails the dead-link admission rule
    let distance = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() / 0.01;
    let gl_forward = (-50.0 - 6.0 * distance - rng.gen_range(0.0, 4.0)).max(-84.0) as i64;
    let gl_reverse = (gl_forward - rng.gen_range(0, 4)).max(-84);
    // the upper band attenuates a few dB more
    let gh_offset = rng.gen_range(2, 6);
    let gh_forward = (gl_forward - gh_offset).max(-100);
    let gh_reverse = (gl_reverse - gh_offset).max(-100);

    json!({
        "rssi_6gh": [gh_forward, gh_reverse],
        "rssi_6gl": [gl_forward, gl_reverse],
    })
}
