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

//! Module containing all error types

use crate::mesh::Band;
use serde_json::{json, Value};
use thiserror::Error;

/// Main error type. Every failure of a planning run is one of these four
/// variants; the facade matches on the variant to render the error document
/// and never exposes the `Debug` representation.
#[derive(Debug, Error)]
pub enum Error {
    /// A payload could not be decoded at all: malformed JSON, a value of the
    /// wrong type where no domain rule applies yet, or an unknown config
    /// field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A domain rule on the decoded payload was violated.
    #[error("Validation of `{field}` failed: {message}")]
    Validation {
        /// What was violated.
        message: String,
        /// Dotted path of the offending field.
        field: String,
        /// The offending value, as found in the payload.
        value: Value,
        /// Machine readable descriptor of the violated constraint.
        constraints: Value,
    },

    /// The spanning tree could not be constructed.
    #[error("Topology generation failed: {0}")]
    TopologyGeneration(String),

    /// A node could not be given an operating channel.
    #[error("Channel assignment failed: {message}")]
    ChannelAssignment {
        /// What went wrong.
        message: String,
        /// The node that could not be assigned, if one is known.
        node_id: Option<String>,
        /// The band the node is locked to by its backhaul link.
        band: Option<Band>,
        /// Channels that were tried, in try order.
        attempted_channels: Vec<u16>,
        /// Nodes whose assignments pruned the candidate channels.
        conflict_nodes: Vec<String>,
    },
}

impl Error {
    /// The tag written to the `error_type` field of the error document.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInputError",
            Self::Validation { .. } => "ValidationError",
            Self::TopologyGeneration(_) => "TopologyGenerationError",
            Self::ChannelAssignment { .. } => "ChannelAssignmentError",
        }
    }

    /// Structured details of the failure, mirroring the variant fields. Used
    /// for logging at the facade boundary.
    pub fn details(&self) -> Value {
        match self {
            Self::InvalidInput(_) => json!({}),
            Self::Validation { field, value, constraints, .. } => json!({
                "field": field,
                "value": value,
                "constraints": constraints,
            }),
            Self::TopologyGeneration(_) => json!({}),
            Self::ChannelAssignment { node_id, band, attempted_channels, conflict_nodes, .. } => {
                json!({
                    "node_id": node_id,
                    "band": band,
                    "attempted_channels": attempted_channels,
                    "conflict_nodes": conflict_nodes,
                })
            }
        }
    }

    /// Shorthand for a [`Error::Validation`].
    pub(crate) fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Value,
        constraints: Value,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.into(),
            value,
            constraints,
        }
    }
}
