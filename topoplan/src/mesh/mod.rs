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

//! # Mesh data model
//!
//! The immutable inputs of a planning run ([`Node`], [`Edge`] and the
//! spectrum vocabulary [`Band`] / [`Bandwidth`]), the mutable planning result
//! [`PlannedNode`], and the [`Mesh`] graph tying nodes and measured links
//! together.

pub(crate) mod graph;
pub(crate) mod types;

pub use graph::{Mesh, MeshLink, MeshNodeId};
pub use types::{Band, BandTable, Bandwidth, BandwidthTable, Edge, Node, PlannedNode};
