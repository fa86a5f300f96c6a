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

//! Decoding and validation of the input payloads.
//!
//! Decoding is an explicit pass over [`serde_json::Value`] documents, not a
//! structural deserialization: every domain rule produces a
//! [`Error::Validation`] naming the offending field, its value and the
//! violated constraint, while non-JSON input and bad config payloads produce
//! [`Error::InvalidInput`].

use crate::config::PlannerConfig;
use crate::mesh::{Band, BandTable, Bandwidth, Edge, MeshLink, Node};
use crate::Error;

use log::*;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Decode and validate the three input payloads of a planning run. Returns
/// the node map (sorted by id), the measured links, and the effective
/// configuration (defaults filled in for omitted fields).
pub fn decode(
    nodes_json: &str,
    edges_json: &str,
    config_json: Option<&str>,
) -> Result<(BTreeMap<String, Node>, Vec<MeshLink>, PlannerConfig), Error> {
    let nodes_doc: Value = serde_json::from_str(nodes_json)
        .map_err(|e| Error::InvalidInput(format!("cannot parse the nodes payload: {}", e)))?;
    let edges_doc: Value = serde_json::from_str(edges_json)
        .map_err(|e| Error::InvalidInput(format!("cannot parse the edges payload: {}", e)))?;

    let nodes_map = nodes_doc.as_object().ok_or_else(|| {
        Error::InvalidInput("the nodes payload must be an object keyed by node id".to_string())
    })?;
    let edges_map = edges_doc.as_object().ok_or_else(|| {
        Error::InvalidInput("the edges payload must be an object keyed by edge key".to_string())
    })?;

    let mut nodes: BTreeMap<String, Node> = BTreeMap::new();
    for (id, data) in nodes_map {
        nodes.insert(id.clone(), decode_node(id, data)?);
    }

    let mut links: Vec<MeshLink> = Vec::with_capacity(edges_map.len());
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    for (key, data) in edges_map {
        let (a, b) = split_edge_key(key, &nodes)?;
        let pair =
            if a < b { (a.to_string(), b.to_string()) } else { (b.to_string(), a.to_string()) };
        if !seen_pairs.insert(pair) {
            return Err(Error::validation(
                "edge_key",
                "duplicate link between the same pair of nodes",
                json!(key),
                json!({ "unordered_pair_unique": true }),
            ));
        }
        let edge = decode_edge(key, data)?;
        links.push(MeshLink { a: a.to_string(), b: b.to_string(), edge });
    }

    let config = match config_json {
        Some(payload) => serde_json::from_str(payload)
            .map_err(|e| Error::InvalidInput(format!("invalid config payload: {}", e)))?,
        None => PlannerConfig::default(),
    };

    debug!("decoded {} nodes and {} links", nodes.len(), links.len());
    Ok((nodes, links, config))
}

fn decode_node(id: &str, data: &Value) -> Result<Node, Error> {
    let record = require_object(data, id, "node record")?;

    let missing: Vec<&str> = ["gps", "load", "channels", "maxEirp"]
        .iter()
        .copied()
        .filter(|f| !record.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        return Err(Error::validation(
            id,
            "node record is missing required fields",
            json!(missing),
            json!({ "required_fields": ["gps", "load", "channels", "maxEirp"] }),
        ));
    }

    let gps = decode_gps(id, &record["gps"])?;
    let load = decode_load(id, &record["load"])?;
    let channels = decode_channels(id, &record["channels"])?;
    let max_eirp = decode_eirp(id, &record["maxEirp"], &channels)?;

    Ok(Node { gps, load, channels, max_eirp })
}

fn decode_gps(id: &str, data: &Value) -> Result<(f64, f64), Error> {
    let field = format!("{}.gps", id);
    let pair = data.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
        Error::validation(
            &field,
            "gps must be a [latitude, longitude] pair",
            data.clone(),
            json!({ "type": "array", "length": 2 }),
        )
    })?;
    let lat = require_number(&pair[0], &field, "gps coordinate")?;
    let lon = require_number(&pair[1], &field, "gps coordinate")?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(Error::validation(
            &field,
            "gps coordinates out of range",
            data.clone(),
            json!({ "latitude": [-90, 90], "longitude": [-180, 180] }),
        ));
    }
    Ok((lat, lon))
}

fn decode_load(id: &str, data: &Value) -> Result<f64, Error> {
    let field = format!("{}.load", id);
    let load = require_number(data, &field, "load")?;
    if load < 0.0 {
        return Err(Error::validation(
            &field,
            "load must not be negative",
            data.clone(),
            json!({ "minimum": 0 }),
        ));
    }
    Ok(load)
}

fn decode_channels(id: &str, data: &Value) -> Result<BandTable<Vec<u16>>, Error> {
    let field = format!("{}.channels", id);
    let bands = require_object(data, &field, "channels table")?;

    let mut table: BandTable<Vec<u16>> = BandTable::default();
    for (band_key, lists) in bands {
        let band = parse_band_key(&field, band_key)?;
        let field = format!("{}.{}", field, band_key);
        let lists = require_object(lists, &field, "per-bandwidth channel lists")?;
        for (bw_key, list) in lists {
            let bw = parse_bandwidth_key(&field, bw_key)?;
            let field = format!("{}.{}", field, bw_key);
            let list = list.as_array().ok_or_else(|| {
                Error::validation(
                    &field,
                    "channel list must be an array",
                    list.clone(),
                    json!({ "type": "array" }),
                )
            })?;
            let (lo, hi) = band.channel_range();
            let mut channels = Vec::with_capacity(list.len());
            for entry in list {
                let ch = entry.as_i64().ok_or_else(|| {
                    Error::validation(
                        &field,
                        "channel numbers must be integers",
                        entry.clone(),
                        json!({ "element_type": "integer" }),
                    )
                })?;
                if ch < lo as i64 || ch > hi as i64 {
                    return Err(Error::validation(
                        &field,
                        format!("channel number out of range for {}", band),
                        entry.clone(),
                        json!({ "range": [lo, hi] }),
                    ));
                }
                channels.push(ch as u16);
            }
            *table.get_mut(band, bw) = channels;
        }
    }
    Ok(table)
}

fn decode_eirp(
    id: &str,
    data: &Value,
    channels: &BandTable<Vec<u16>>,
) -> Result<BandTable<Vec<f64>>, Error> {
    let field = format!("{}.maxEirp", id);
    let bands = require_object(data, &field, "maxEirp table")?;

    let mut table: BandTable<Vec<f64>> = BandTable::default();
    for (band_key, lists) in bands {
        let band = parse_band_key(&field, band_key)?;
        let field = format!("{}.{}", field, band_key);
        let lists = require_object(lists, &field, "per-bandwidth EIRP lists")?;
        for (bw_key, list) in lists {
            let bw = parse_bandwidth_key(&field, bw_key)?;
            let field = format!("{}.{}", field, bw_key);
            let list = list.as_array().ok_or_else(|| {
                Error::validation(
                    &field,
                    "EIRP list must be an array",
                    list.clone(),
                    json!({ "type": "array" }),
                )
            })?;
            let mut caps = Vec::with_capacity(list.len());
            for entry in list {
                let eirp = require_number(entry, &field, "EIRP cap")?;
                if !(0.0..=36.0).contains(&eirp) {
                    return Err(Error::validation(
                        &field,
                        "EIRP cap out of range",
                        entry.clone(),
                        json!({ "range": [0, 36] }),
                    ));
                }
                caps.push(eirp);
            }
            *table.get_mut(band, bw) = caps;
        }
    }

    // every (band, width) slot must line up with the channel list, in both
    // directions: a cap without a channel is as wrong as a channel without a
    // cap
    for &band in &Band::ALL {
        for &bw in &Bandwidth::DESCENDING {
            let n_channels = channels.get(band, bw).len();
            let n_caps = table.get(band, bw).len();
            if n_channels != n_caps {
                return Err(Error::validation(
                    format!("{}.{}.{}", field, band.table_key(), bw.table_key()),
                    "EIRP list length does not match the channel list",
                    json!({ "eirp_length": n_caps, "channel_length": n_channels }),
                    json!({ "lengths_must_match": true }),
                ));
            }
        }
    }

    Ok(table)
}

fn split_edge_key<'a>(
    key: &'a str,
    nodes: &BTreeMap<String, Node>,
) -> Result<(&'a str, &'a str), Error> {
    let format_err = || {
        Error::validation(
            "edge_key",
            "edge key must name two nodes",
            json!(key),
            json!({ "format": "SN<number>_SN<number>" }),
        )
    };
    // node ids may themselves contain underscores, so split on the last one
    let (a, b) = key.rsplit_once('_').ok_or_else(format_err)?;
    if !a.starts_with("SN") || !b.starts_with("SN") {
        return Err(format_err());
    }
    if a == b {
        return Err(Error::validation(
            "edge_key",
            "edge endpoints must differ",
            json!(key),
            json!({ "endpoints_must_differ": true }),
        ));
    }
    for endpoint in [a, b].iter() {
        if !nodes.contains_key(*endpoint) {
            return Err(Error::validation(
                "edge_key",
                "edge endpoint does not name a known node",
                json!(key),
                json!({ "endpoints_must_exist": true }),
            ));
        }
    }
    Ok((a, b))
}

fn decode_edge(key: &str, data: &Value) -> Result<Edge, Error> {
    let record = require_object(data, key, "edge record")?;

    let missing: Vec<&str> = ["rssi_6gh", "rssi_6gl"]
        .iter()
        .copied()
        .filter(|f| !record.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        return Err(Error::validation(
            key,
            "edge record is missing required fields",
            json!(missing),
            json!({ "required_fields": ["rssi_6gh", "rssi_6gl"] }),
        ));
    }

    let rssi_6gh = decode_rssi_pair(key, "rssi_6gh", &record["rssi_6gh"])?;
    let rssi_6gl = decode_rssi_pair(key, "rssi_6gl", &record["rssi_6gl"])?;

    // the upper band attenuates more, so it can never be the stronger one,
    // and the two bands of one direction should roughly agree
    for (i, &(gh, gl)) in [(rssi_6gh.0, rssi_6gl.0), (rssi_6gh.1, rssi_6gl.1)]
        .iter()
        .enumerate()
    {
        if gh > gl {
            return Err(Error::validation(
                format!("{}.rssi_comparison_{}", key, i),
                "6GH RSSI must not be stronger than 6GL RSSI",
                json!({ "6gh": gh, "6gl": gl }),
                json!({ "rule": "6GH_RSSI <= 6GL_RSSI" }),
            ));
        }
        if (gh - gl).abs() > 15 {
            return Err(Error::validation(
                format!("{}.frequency_difference_{}", key, i),
                "RSSI difference between the bands is too large",
                json!({ "6gh": gh, "6gl": gl }),
                json!({ "max_difference": 15 }),
            ));
        }
    }

    let edge = Edge { rssi_6gh, rssi_6gl };
    if edge.samples().iter().all(|&rssi| rssi <= -85) {
        return Err(Error::validation(
            format!("{}.rssi_all", key),
            "all RSSI samples are too weak for a usable link",
            json!({ "rssi_6gh": [rssi_6gh.0, rssi_6gh.1], "rssi_6gl": [rssi_6gl.0, rssi_6gl.1] }),
            json!({ "minimum_valid_rssi": -85 }),
        ));
    }

    Ok(edge)
}

fn decode_rssi_pair(key: &str, name: &str, data: &Value) -> Result<(i16, i16), Error> {
    let field = format!("{}.{}", key, name);
    let pair = data.as_array().filter(|a| a.len() == 2).ok_or_else(|| {
        Error::validation(
            &field,
            "RSSI must be a [forward, reverse] pair",
            data.clone(),
            json!({ "type": "array", "length": 2 }),
        )
    })?;
    let mut values = [0i16; 2];
    for (i, entry) in pair.iter().enumerate() {
        let rssi = entry.as_i64().ok_or_else(|| {
            Error::validation(
                &field,
                "RSSI samples must be integers",
                entry.clone(),
                json!({ "element_type": "integer" }),
            )
        })?;
        if !(-100..=0).contains(&rssi) {
            return Err(Error::validation(
                &field,
                "RSSI sample out of range",
                entry.clone(),
                json!({ "range": [-100, 0] }),
            ));
        }
        values[i] = rssi as i16;
    }
    if (values[0] - values[1]).abs() > 20 {
        return Err(Error::validation(
            &field,
            "forward and reverse RSSI differ too much",
            data.clone(),
            json!({ "max_difference": 20 }),
        ));
    }
    Ok((values[0], values[1]))
}

fn parse_band_key(field: &str, key: &str) -> Result<Band, Error> {
    Band::from_table_key(key).ok_or_else(|| {
        Error::validation(
            format!("{}.{}", field, key),
            "unknown band",
            json!(key),
            json!({ "valid_values": ["6GH", "6GL"] }),
        )
    })
}

fn parse_bandwidth_key(field: &str, key: &str) -> Result<Bandwidth, Error> {
    Bandwidth::from_table_key(key).ok_or_else(|| {
        Error::validation(
            format!("{}.{}", field, key),
            "unknown bandwidth",
            json!(key),
            json!({ "valid_values": ["160M", "80M", "40M", "20M"] }),
        )
    })
}

fn require_object<'a>(
    data: &'a Value,
    field: &str,
    what: &str,
) -> Result<&'a Map<String, Value>, Error> {
    data.as_object().ok_or_else(|| {
        Error::validation(
            field,
            format!("{} must be an object", what),
            data.clone(),
            json!({ "type": "object" }),
        )
    })
}

fn require_number(data: &Value, field: &str, what: &str) -> Result<f64, Error> {
    data.as_f64().filter(|v| v.is_finite()).ok_or_else(|| {
        Error::validation(
            field,
            format!("{} must be a finite number", what),
            data.clone(),
            json!({ "type": "number" }),
        )
    })
}
