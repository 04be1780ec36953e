/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(dead_code)]

use async_trait::async_trait;
use location_service::{
    common::types::{PartyRole, Position},
    outbound::external::{RemoteLocationStore, ReverseGeocoder},
    tools::error::AppError,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub fn position(latitude: f64, longitude: f64) -> Position {
    Position {
        latitude,
        longitude,
    }
}

/// Store that reports every push on a channel and answers pulls with a
/// settable value.
pub struct RecordingStore {
    pushed_tx: UnboundedSender<(PartyRole, Position)>,
    counterpart: Mutex<Result<Position, String>>,
    fail_pushes: bool,
    pull_delay: Option<Duration>,
}

impl RecordingStore {
    pub fn new() -> (Self, UnboundedReceiver<(PartyRole, Position)>) {
        let (pushed_tx, pushed_rx) = mpsc::unbounded_channel();
        (
            RecordingStore {
                pushed_tx,
                counterpart: Mutex::new(Err("no counterpart yet".to_string())),
                fail_pushes: false,
                pull_delay: None,
            },
            pushed_rx,
        )
    }

    pub fn failing_pushes(mut self) -> Self {
        self.fail_pushes = true;
        self
    }

    pub fn with_pull_delay(mut self, delay: Duration) -> Self {
        self.pull_delay = Some(delay);
        self
    }

    pub fn set_counterpart(&self, position: Position) {
        if let Ok(mut counterpart) = self.counterpart.lock() {
            *counterpart = Ok(position);
        }
    }

    pub fn fail_pulls(&self, reason: &str) {
        if let Ok(mut counterpart) = self.counterpart.lock() {
            *counterpart = Err(reason.to_string());
        }
    }
}

#[async_trait]
impl RemoteLocationStore for RecordingStore {
    async fn set_position(&self, role: PartyRole, position: Position) -> Result<(), AppError> {
        let _ = self.pushed_tx.send((role, position));
        if self.fail_pushes {
            return Err(AppError::NetworkFailure("push refused".to_string()));
        }
        Ok(())
    }

    async fn get_counterpart_position(&self) -> Result<Position, AppError> {
        if let Some(delay) = self.pull_delay {
            tokio::time::sleep(delay).await;
        }
        let counterpart = self
            .counterpart
            .lock()
            .map_err(|err| AppError::InternalError(err.to_string()))?
            .clone();
        counterpart.map_err(AppError::NetworkFailure)
    }
}

/// Geocoder answering `address of <lat>,<lng>` and counting lookups.
#[derive(Default)]
pub struct EchoGeocoder {
    pub lookups: AtomicUsize,
}

impl EchoGeocoder {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for EchoGeocoder {
    async fn reverse(&self, position: &Position) -> Result<String, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "address of {},{}",
            position.latitude, position.longitude
        ))
    }
}

pub struct FailingGeocoder;

#[async_trait]
impl ReverseGeocoder for FailingGeocoder {
    async fn reverse(&self, _position: &Position) -> Result<String, AppError> {
        Err(AppError::GeocodeFailure("geocoder down".to_string()))
    }
}
