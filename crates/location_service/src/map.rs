/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::{MarkerId, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub max_zoom: u8,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MarkerPopup {
    pub title: String,
    pub address: String,
}

impl MarkerPopup {
    pub fn to_html(&self) -> String {
        format!("{}<br>{}", self.title, self.address)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: Position,
    pub popup: MarkerPopup,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct MapSnapshot {
    pub center: Option<Position>,
    pub zoom: Option<u8>,
    pub tile_layer: Option<TileLayer>,
    pub markers: Vec<Marker>,
    pub route: Option<[Position; 2]>,
}

/// Drawing primitives of the map the positions are rendered on.
pub trait MapWidget: Send {
    fn set_view(&mut self, center: Position, zoom: u8);

    /// Replaces any previous tile layer.
    fn set_tile_layer(&mut self, layer: TileLayer);

    fn add_marker(&mut self, position: Position, popup: MarkerPopup) -> MarkerId;

    /// Returns `false` when no marker with this id is on the map.
    fn remove_marker(&mut self, id: MarkerId) -> bool;

    /// Replaces any previous route.
    fn set_route(&mut self, waypoints: [Position; 2]);

    fn snapshot(&self) -> MapSnapshot;
}

/// Headless map that only records what would be drawn.
#[derive(Debug, Default)]
pub struct InMemoryMap {
    center: Option<Position>,
    zoom: Option<u8>,
    tile_layer: Option<TileLayer>,
    markers: BTreeMap<MarkerId, Marker>,
    route: Option<[Position; 2]>,
    next_marker_id: u64,
}

impl InMemoryMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapWidget for InMemoryMap {
    fn set_view(&mut self, center: Position, zoom: u8) {
        self.center = Some(center);
        self.zoom = Some(zoom);
    }

    fn set_tile_layer(&mut self, layer: TileLayer) {
        self.tile_layer = Some(layer);
    }

    fn add_marker(&mut self, position: Position, popup: MarkerPopup) -> MarkerId {
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        self.markers.insert(
            id,
            Marker {
                id,
                position,
                popup,
            },
        );
        id
    }

    fn remove_marker(&mut self, id: MarkerId) -> bool {
        self.markers.remove(&id).is_some()
    }

    fn set_route(&mut self, waypoints: [Position; 2]) {
        self.route = Some(waypoints);
    }

    fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            center: self.center,
            zoom: self.zoom,
            tile_layer: self.tile_layer.clone(),
            markers: self.markers.values().cloned().collect(),
            route: self.route,
        }
    }
}
