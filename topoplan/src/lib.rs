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

#![deny(missing_docs)]

//! # Topoplan: Planning Backhaul Topologies for 6 GHz Wireless Mesh Networks
//!
//! This is a library for planning the backhaul topology of a multi-hop
//! wireless mesh operating in the two halves of the 6 GHz band. Given the
//! candidate nodes (supported channels and transmit power caps per band and
//! width, plus a load estimate) and the measured links between them
//! (bidirectional RSSI per band), it produces a rooted spanning tree together
//! with an operating channel, width and EIRP assignment per node, honoring
//! interference, fan-out, hop and signal-strength constraints.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`mesh`]**: The data model. [`Node`](mesh::Node) and
//!   [`Edge`](mesh::Edge) are the immutable inputs of a run,
//!   [`PlannedNode`](mesh::PlannedNode) the per-node result, and
//!   [`Mesh`](mesh::Mesh) ties them together as an undirected graph.
//!
//! - **[`input`]**: Decoding and validation of the JSON payloads. Every
//!   domain rule is checked explicitly and reported with the offending field,
//!   value and constraint.
//!
//! - **[`tree`]**: The [`TreeBuilder`](tree::TreeBuilder), a Prim-style
//!   greedy that grows a maximum-weight spanning tree under RSSI, degree and
//!   hop constraints, alternating the backhaul band between tree levels.
//!
//! - **[`channels`]**: The [`ChannelAssigner`](channels::ChannelAssigner),
//!   a band-constrained coloring pass that walks the tree level by level
//!   (inside a level by descending load) and gives each node the widest
//!   channel that does not collide with a conflicting neighbor, backing off
//!   from 160 MHz down to 20 MHz.
//!
//! - **[`config`]**: The [`PlannerConfig`](config::PlannerConfig) knobs
//!   (weights, thresholds, caps) with their defaults.
//!
//! ## Usage
//!
//! The document-level entry point is [`plan`], which takes the three JSON
//! payloads and always returns a result document:
//!
//! ```
//! use topoplan::plan;
//!
//! let nodes = r#"{
//!     "SN0": { "gps": [47.37, 8.54], "load": 10,
//!              "channels": { "6GH": {"160M": [111]}, "6GL": {"160M": [15]} },
//!              "maxEirp":  { "6GH": {"160M": [30.0]}, "6GL": {"160M": [24.0]} } }
//! }"#;
//!
//! let result = plan(nodes, "{}", None);
//! assert!(result.starts_with(r#"{"status":"success""#));
//! ```
//!
//! Callers that want the typed result instead of a document use
//! [`try_plan`], which returns the planned tree or the [`Error`] that ended
//! the run.

pub mod channels;
pub mod config;
mod error;
pub mod input;
pub mod mesh;
pub mod tree;

mod plan;
pub use plan::{plan, try_plan};

pub use error::Error;

// test modules
mod test;
