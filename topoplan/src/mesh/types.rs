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

//! Module containing all type definitions of the mesh data model.

use serde::{Serialize, Serializer};
use std::fmt;

/// The two halves of the 6 GHz spectrum, treated as disjoint channel pools.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum Band {
    /// Upper half (`6GH`), channel numbers in `[100, 200]`.
    High,
    /// Lower half (`6GL`), channel numbers in `[1, 100]`.
    Low,
}

impl Band {
    /// Both bands, in the order in which root radios are brought up.
    pub const ALL: [Band; 2] = [Band::High, Band::Low];

    /// The key under which this band appears in the channel and EIRP tables
    /// of the input payload (`6GH` / `6GL`).
    pub fn table_key(self) -> &'static str {
        match self {
            Self::High => "6GH",
            Self::Low => "6GL",
        }
    }

    /// Parses a table key back into a band.
    pub fn from_table_key(key: &str) -> Option<Self> {
        match key {
            "6GH" => Some(Self::High),
            "6GL" => Some(Self::Low),
            _ => None,
        }
    }

    /// The backhaul tag used in the result document (`H` / `L`).
    pub fn tag(self) -> &'static str {
        match self {
            Self::High => "H",
            Self::Low => "L",
        }
    }

    /// The band assigned to a child attached below a parent at the given
    /// level. Even levels radiate on the upper band, odd levels on the lower
    /// band, alternating down the tree.
    pub fn for_parent_level(level: usize) -> Self {
        if level % 2 == 0 {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Inclusive range of admissible channel numbers in this band.
    pub fn channel_range(self) -> (u16, u16) {
        match self {
            Self::High => (100, 200),
            Self::Low => (1, 100),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.table_key())
    }
}

impl Serialize for Band {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// Channel width of a radio.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Bandwidth {
    /// 160 MHz
    Mhz160,
    /// 80 MHz
    Mhz80,
    /// 40 MHz
    Mhz40,
    /// 20 MHz
    Mhz20,
}

impl Bandwidth {
    /// All widths in backoff order, widest first.
    pub const DESCENDING: [Bandwidth; 4] =
        [Bandwidth::Mhz160, Bandwidth::Mhz80, Bandwidth::Mhz40, Bandwidth::Mhz20];

    /// The key under which this width appears in the channel and EIRP tables
    /// of the input payload (`160M` / `80M` / `40M` / `20M`).
    pub fn table_key(self) -> &'static str {
        match self {
            Self::Mhz160 => "160M",
            Self::Mhz80 => "80M",
            Self::Mhz40 => "40M",
            Self::Mhz20 => "20M",
        }
    }

    /// Parses a table key back into a width.
    pub fn from_table_key(key: &str) -> Option<Self> {
        match key {
            "160M" => Some(Self::Mhz160),
            "80M" => Some(Self::Mhz80),
            "40M" => Some(Self::Mhz40),
            "20M" => Some(Self::Mhz20),
            _ => None,
        }
    }

    /// Numeric width in MHz, as written to the result document.
    pub fn mhz(self) -> u16 {
        match self {
            Self::Mhz160 => 160,
            Self::Mhz80 => 80,
            Self::Mhz40 => 40,
            Self::Mhz20 => 20,
        }
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.table_key())
    }
}

/// One slot per supported channel width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandwidthTable<T> {
    /// Entries for 160 MHz operation.
    pub bw160: T,
    /// Entries for 80 MHz operation.
    pub bw80: T,
    /// Entries for 40 MHz operation.
    pub bw40: T,
    /// Entries for 20 MHz operation.
    pub bw20: T,
}

impl<T> BandwidthTable<T> {
    /// Returns the entry for the given width.
    pub fn get(&self, bw: Bandwidth) -> &T {
        match bw {
            Bandwidth::Mhz160 => &self.bw160,
            Bandwidth::Mhz80 => &self.bw80,
            Bandwidth::Mhz40 => &self.bw40,
            Bandwidth::Mhz20 => &self.bw20,
        }
    }

    /// Returns the entry for the given width mutably.
    pub fn get_mut(&mut self, bw: Bandwidth) -> &mut T {
        match bw {
            Bandwidth::Mhz160 => &mut self.bw160,
            Bandwidth::Mhz80 => &mut self.bw80,
            Bandwidth::Mhz40 => &mut self.bw40,
            Bandwidth::Mhz20 => &mut self.bw20,
        }
    }
}

/// Per-band, per-width table, used for both the supported channel lists and
/// the EIRP caps of a node. The order inside each list is significant: the
/// position of a channel is the index of its EIRP cap in the matching list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandTable<T> {
    /// Entries for the upper band (`6GH`).
    pub high: BandwidthTable<T>,
    /// Entries for the lower band (`6GL`).
    pub low: BandwidthTable<T>,
}

impl<T> BandTable<T> {
    /// Returns the entry for the given band and width.
    pub fn get(&self, band: Band, bw: Bandwidth) -> &T {
        match band {
            Band::High => self.high.get(bw),
            Band::Low => self.low.get(bw),
        }
    }

    /// Returns the entry for the given band and width mutably.
    pub fn get_mut(&mut self, band: Band, bw: Bandwidth) -> &mut T {
        match band {
            Band::High => self.high.get_mut(bw),
            Band::Low => self.low.get_mut(bw),
        }
    }
}

/// A candidate mesh node, as described in the nodes payload. All fields are
/// immutable inputs to a planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position as `(latitude, longitude)`.
    pub gps: (f64, f64),
    /// Estimated traffic load (non-negative, unitless).
    pub load: f64,
    /// Supported channels per band and width. A missing width means the node
    /// cannot operate at that width in that band.
    pub channels: BandTable<Vec<u16>>,
    /// Regulator-capped transmit power per channel, index-aligned with
    /// [`Node::channels`].
    pub max_eirp: BandTable<Vec<f64>>,
}

/// A measured link between two nodes, with one `(forward, reverse)` RSSI
/// sample pair per band (dBm, always negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// RSSI samples on the upper band.
    pub rssi_6gh: (i16, i16),
    /// RSSI samples on the lower band.
    pub rssi_6gl: (i16, i16),
}

impl Edge {
    /// All four RSSI samples of the link.
    pub fn samples(&self) -> [i16; 4] {
        [self.rssi_6gh.0, self.rssi_6gh.1, self.rssi_6gl.0, self.rssi_6gl.1]
    }

    /// The strongest RSSI sample over both bands and directions.
    pub fn best_rssi(&self) -> i16 {
        // samples() is never empty
        self.samples().iter().copied().max().unwrap_or(i16::MIN)
    }
}

/// The planning result for a single node. Created empty by the tree builder
/// (parent, level and backhaul band only) and completed by the channel
/// assigner. Serializes directly into the `data` entries of the result
/// document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedNode {
    /// Parent node id, or `None` for the root.
    pub parent: Option<String>,
    /// Band of the link towards the parent, or `None` for the root.
    pub backhaul_band: Option<Band>,
    /// Depth in the tree (root is 0).
    pub level: usize,
    /// Assigned operating channels. One entry for every non-root node, up to
    /// one per band for the root.
    pub channel: Vec<u16>,
    /// Channel widths in MHz, index-aligned with `channel`.
    pub bandwidth: Vec<u16>,
    /// Transmit power caps in dBm, index-aligned with `channel`.
    pub max_eirp: Vec<f64>,
}

impl PlannedNode {
    /// A fresh root entry. Radios are assigned later by the channel assigner.
    pub fn root() -> Self {
        Self {
            parent: None,
            backhaul_band: None,
            level: 0,
            channel: Vec::new(),
            bandwidth: Vec::new(),
            max_eirp: Vec::new(),
        }
    }

    /// A fresh entry for a node attached below `parent` at the given level.
    pub fn child(parent: &str, band: Band, level: usize) -> Self {
        Self {
            parent: Some(parent.to_string()),
            backhaul_band: Some(band),
            level,
            channel: Vec::new(),
            bandwidth: Vec::new(),
            max_eirp: Vec::new(),
        }
    }

    /// Whether this entry is the root of the tree.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
