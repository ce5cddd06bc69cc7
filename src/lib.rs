// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::deprecated_clippy_cfg_attr,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

pub mod pathfinding;
pub mod projection;
pub mod proximity_graph;
pub mod spatial_index;
pub mod stations_reader;

#[cfg(test)]
pub mod test_planning;

use serde::{Deserialize, Serialize};

/// Identifier of a station node. Imported stations keep the id from the
/// operator roster; the two ad-hoc query points of a planning request use
/// the reserved negative ids below so they can never collide with a station.
pub type StationId = i64;

pub const ORIGIN_STATION_ID: StationId = -1;
pub const DESTINATION_STATION_ID: StationId = -2;

/// A station projected onto the local planar coordinate system, in meters.
/// Coordinates are immutable once the record exists; edge weights derived
/// from them are never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: StationId,
    pub x: f64,
    pub y: f64,
}

pub fn euclidean_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}
