/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::tools::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        Position {
            latitude,
            longitude,
        }
        .validate()
    }

    /// Rejects anything that is not a finite coordinate on the globe.
    pub fn validate(self) -> Result<Self, AppError> {
        let Position {
            latitude,
            longitude,
        } = self;
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude)
            || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
        {
            return Err(AppError::InvalidCoordinates(latitude, longitude));
        }
        Ok(self)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    EnumString,
    EnumIter,
    Display,
    Serialize,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Parent,
    Child,
}

impl PartyRole {
    pub fn counterpart(&self) -> PartyRole {
        match self {
            PartyRole::Parent => PartyRole::Child,
            PartyRole::Child => PartyRole::Parent,
        }
    }

    pub fn marker_label(&self) -> &'static str {
        match self {
            PartyRole::Parent => "Parent Location",
            PartyRole::Child => "Child Location",
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd)]
pub struct Timestamp(pub DateTime<Utc>);

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct LocationRecord {
    pub role: PartyRole,
    pub position: Position,
    pub timestamp: Timestamp,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, Display)]
pub enum RecordState {
    Unknown,
    Known,
}

/// One authoritative slot per role. A slot goes from empty to filled and is
/// only ever overwritten afterwards.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct PositionBook {
    parent: Option<LocationRecord>,
    child: Option<LocationRecord>,
}

impl PositionBook {
    pub fn set(&mut self, role: PartyRole, position: Position) -> LocationRecord {
        let record = LocationRecord {
            role,
            position,
            timestamp: Timestamp(Utc::now()),
        };
        *self.slot_mut(role) = Some(record);
        record
    }

    pub fn get(&self, role: PartyRole) -> Option<&LocationRecord> {
        match role {
            PartyRole::Parent => self.parent.as_ref(),
            PartyRole::Child => self.child.as_ref(),
        }
    }

    pub fn position(&self, role: PartyRole) -> Option<Position> {
        self.get(role).map(|record| record.position)
    }

    pub fn state(&self, role: PartyRole) -> RecordState {
        match self.get(role) {
            Some(_) => RecordState::Known,
            None => RecordState::Unknown,
        }
    }

    /// Both positions, or `None` while either role is still unknown.
    pub fn route_state(&self) -> Option<RouteState> {
        match (self.position(PartyRole::Parent), self.position(PartyRole::Child)) {
            (Some(parent), Some(child)) => Some(RouteState { parent, child }),
            _ => None,
        }
    }

    fn slot_mut(&mut self, role: PartyRole) -> &mut Option<LocationRecord> {
        match role {
            PartyRole::Parent => &mut self.parent,
            PartyRole::Child => &mut self.child,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct RouteState {
    pub parent: Position,
    pub child: Position,
}

impl RouteState {
    pub fn position(&self, role: PartyRole) -> Position {
        match role {
            PartyRole::Parent => self.parent,
            PartyRole::Child => self.child,
        }
    }

    pub fn waypoints(&self) -> [Position; 2] {
        [self.parent, self.child]
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct MarkerId(pub u64);
