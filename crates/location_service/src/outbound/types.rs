/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::{PartyRole, Position};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PositionPayload {
    pub latitude: f64,
    pub longitude: f64,
    pub user: PartyRole,
}

impl PositionPayload {
    pub fn new(role: PartyRole, position: Position) -> Self {
        PositionPayload {
            latitude: position.latitude,
            longitude: position.longitude,
            user: role,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CounterpartPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<CounterpartPosition> for Position {
    fn from(value: CounterpartPosition) -> Self {
        Position {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ReverseGeocodeResponse {
    pub display_name: Option<String>,
}
