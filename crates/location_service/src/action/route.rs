/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::types::{MarkerId, PartyRole, Position, RouteState},
    map::{MapWidget, MarkerPopup, TileLayer},
    outbound::external::ReverseGeocoder,
    tools::prometheus::{GEOCODE_FAILURES, ROUTE_UPDATES},
};
use std::{collections::HashMap, sync::Arc};
use strum::IntoEnumIterator;
use tracing::*;

pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// Keeps the map showing one marker per role and a single route between
/// them.
pub struct RouteView<M> {
    map: M,
    geocoder: Arc<dyn ReverseGeocoder>,
    zoom: u8,
    markers: HashMap<PartyRole, MarkerId>,
    addresses: HashMap<PartyRole, (Position, String)>,
}

impl<M: MapWidget> RouteView<M> {
    pub fn new(map: M, geocoder: Arc<dyn ReverseGeocoder>, zoom: u8) -> Self {
        RouteView {
            map,
            geocoder,
            zoom,
            markers: HashMap::new(),
            addresses: HashMap::new(),
        }
    }

    pub fn initialize(&mut self, tile_layer: TileLayer) {
        self.map.set_tile_layer(tile_layer);
    }

    pub fn center_on(&mut self, position: Position) {
        self.map.set_view(position, self.zoom);
    }

    pub async fn update_route(&mut self, route: &RouteState) {
        for role in PartyRole::iter() {
            self.place_marker(role, route.position(role)).await;
        }
        self.map.set_route(route.waypoints());
        ROUTE_UPDATES.inc();
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    async fn place_marker(&mut self, role: PartyRole, position: Position) {
        let address = self.address_for(role, position).await;
        if let Some(previous) = self.markers.remove(&role) {
            self.map.remove_marker(previous);
        }
        let id = self.map.add_marker(
            position,
            MarkerPopup {
                title: role.marker_label().to_string(),
                address,
            },
        );
        self.markers.insert(role, id);
    }

    /// Only successful lookups are remembered, so a failed one is retried on
    /// the next update.
    async fn address_for(&mut self, role: PartyRole, position: Position) -> String {
        if let Some((looked_up_at, address)) = self.addresses.get(&role) {
            if *looked_up_at == position {
                return address.to_owned();
            }
        }

        match self.geocoder.reverse(&position).await {
            Ok(address) => {
                self.addresses.insert(role, (position, address.to_owned()));
                address
            }
            Err(err) => {
                GEOCODE_FAILURES.inc();
                error!("Error fetching address for {} : {}", role, err);
                ADDRESS_NOT_FOUND.to_string()
            }
        }
    }
}
