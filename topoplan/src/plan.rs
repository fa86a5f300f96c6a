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

//! # Topoplan
//! Wrapper functions to run a complete planning pipeline.

use crate::channels::ChannelAssigner;
use crate::input;
use crate::mesh::{Mesh, PlannedNode};
use crate::tree::TreeBuilder;
use crate::Error;

use log::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fallback document when even rendering fails; also the shape of the
/// catch-all arm of [`plan`].
static UNEXPECTED_ERROR_DOCUMENT: &str =
    r#"{"status":"error","error_type":"UnexpectedError","message":"internal error"}"#;

/// # Plan a backhaul topology
///
/// Runs the full pipeline (decode and validate, build the tree, assign
/// channels) on the raw JSON payloads and returns the planned tree, keyed by
/// node id. Nodes that could not be attached to the tree are absent from the
/// result.
///
/// ## Usage
///
/// ```
/// use topoplan::try_plan;
/// use topoplan::Error;
///
/// fn main() -> Result<(), Error> {
///     let nodes = r#"{
///         "SN0": { "gps": [47.37, 8.54], "load": 10,
///                  "channels": { "6GH": {"160M": [111]}, "6GL": {"160M": [15]} },
///                  "maxEirp":  { "6GH": {"160M": [30.0]}, "6GL": {"160M": [24.0]} } },
///         "SN1": { "gps": [47.38, 8.55], "load": 5,
///                  "channels": { "6GH": {"160M": [143]} },
///                  "maxEirp":  { "6GH": {"160M": [33.0]} } }
///     }"#;
///     let edges = r#"{ "SN0_SN1": { "rssi_6gh": [-60, -62], "rssi_6gl": [-55, -57] } }"#;
///
///     let tree = try_plan(nodes, edges, None)?;
///
///     assert_eq!(tree["SN1"].parent.as_deref(), Some("SN0"));
///     assert_eq!(tree["SN1"].level, 1);
///     Ok(())
/// }
/// ```
pub fn try_plan(
    nodes_json: &str,
    edges_json: &str,
    config_json: Option<&str>,
) -> Result<BTreeMap<String, PlannedNode>, Error> {
    let (nodes, links, config) = input::decode(nodes_json, edges_json, config_json)?;
    info!("planning a backhaul topology over {} nodes and {} links", nodes.len(), links.len());

    let mesh = Mesh::new(nodes, links)?;
    let mut tree = TreeBuilder::new(&mesh, &config).build()?;
    ChannelAssigner::new(&mesh, &config).assign(&mut tree)?;

    info!("planned {} of {} nodes", tree.len(), mesh.len());
    Ok(tree)
}

/// # Plan a backhaul topology (document interface)
///
/// Same as [`try_plan`], but takes and returns JSON documents: a success
/// renders as `{"status": "success", "data": {...}}`, any planning failure
/// is caught and rendered as `{"status": "error", "error_type": ...,
/// "message": ...}`. This function never fails.
pub fn plan(nodes_json: &str, edges_json: &str, config_json: Option<&str>) -> String {
    match try_plan(nodes_json, edges_json, config_json) {
        Ok(tree) => render_success(&tree),
        Err(e) => {
            error!("planning failed: {} {}", e, e.details());
            render_error(&e)
        }
    }
}

#[derive(Serialize)]
struct SuccessDocument<'a> {
    status: &'static str,
    data: &'a BTreeMap<String, PlannedNode>,
}

#[derive(Serialize)]
struct ErrorDocument<'a> {
    status: &'static str,
    error_type: &'a str,
    message: String,
}

fn render_success(tree: &BTreeMap<String, PlannedNode>) -> String {
    serde_json::to_string(&SuccessDocument { status: "success", data: tree })
        .unwrap_or_else(|e| {
            error!("cannot serialize the result document: {}", e);
            UNEXPECTED_ERROR_DOCUMENT.to_string()
        })
}

fn render_error(error: &Error) -> String {
    let document = ErrorDocument {
        status: "error",
        error_type: error.error_type(),
        message: error.to_string(),
    };
    serde_json::to_string(&document).unwrap_or_else(|_| UNEXPECTED_ERROR_DOCUMENT.to_string())
}
