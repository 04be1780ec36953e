/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::{
        types::{Position, RouteState},
        utils::{format_distance_km, great_circle_distance_km},
    },
    tools::prometheus::SEPARATION_KM,
};
use tracing::*;

#[derive(Debug, Default)]
pub struct DistanceMonitor {
    last_km: Option<f64>,
}

impl DistanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Great-circle separation in kilometres.
    pub fn compute(parent: &Position, child: &Position) -> f64 {
        great_circle_distance_km(parent, child)
    }

    pub fn report(&mut self, route: &RouteState) -> f64 {
        let distance_km = Self::compute(&route.parent, &route.child);
        info!(
            tag = "[DISTANCE]",
            distance_km, "Distance: {}",
            format_distance_km(distance_km)
        );
        SEPARATION_KM.set(distance_km);
        self.last_km = Some(distance_km);
        distance_km
    }

    pub fn last_km(&self) -> Option<f64> {
        self.last_km
    }
}
