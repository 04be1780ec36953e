/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::distance::DistanceMonitor;
use crate::{
    common::types::{PartyRole, Position, PositionBook, RouteState},
    outbound::external::RemoteLocationStore,
    tools::{
        error::AppError,
        prometheus::{LOCAL_FIXES, REMOTE_PULLS, REMOTE_PULL_FAILURES, REMOTE_PUSH_FAILURES},
    },
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::*;

/// What the rest of the service sees after every update. `route` and
/// `distance_km` stay `None` until both roles are known.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct SyncState {
    pub positions: PositionBook,
    pub route: Option<RouteState>,
    pub distance_km: Option<f64>,
}

/// Owner of both parties' positions. Local fixes write the local role's
/// slot and are pushed to the remote store; pulls write the counterpart's
/// slot. Every accepted write republishes the derived `SyncState`.
pub struct LocationSync {
    local_role: PartyRole,
    positions: PositionBook,
    store: Arc<dyn RemoteLocationStore>,
    distance: DistanceMonitor,
    state_tx: watch::Sender<SyncState>,
}

impl LocationSync {
    pub fn new(store: Arc<dyn RemoteLocationStore>, state_tx: watch::Sender<SyncState>) -> Self {
        LocationSync {
            local_role: PartyRole::Parent,
            positions: PositionBook::default(),
            store,
            distance: DistanceMonitor::new(),
            state_tx,
        }
    }

    pub fn local_role(&self) -> PartyRole {
        self.local_role
    }

    pub fn store(&self) -> Arc<dyn RemoteLocationStore> {
        self.store.clone()
    }

    pub fn positions(&self) -> &PositionBook {
        &self.positions
    }

    pub fn last_distance_km(&self) -> Option<f64> {
        self.distance.last_km()
    }

    pub fn state(&self) -> SyncState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state_tx.subscribe()
    }

    /// Records the fix and pushes it with a single best-effort attempt. The
    /// push runs on its own task; its failure is only logged.
    pub fn on_local_fix(&mut self, position: Position) {
        let position = match position.validate() {
            Ok(position) => position,
            Err(err) => {
                warn!("Dropping local fix : {}", err);
                return;
            }
        };

        LOCAL_FIXES.inc();
        let role = self.local_role;
        self.positions.set(role, position);

        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.set_position(role, position).await {
                REMOTE_PUSH_FAILURES.inc();
                error!("Error pushing {} location : {}", role, err);
            }
        });

        self.recompute();
    }

    /// Fetches the counterpart's position and applies it. Never fails; see
    /// `apply_pull`.
    pub async fn pull_remote(&mut self) -> bool {
        let result = self.store.get_counterpart_position().await;
        self.apply_pull(result)
    }

    /// Applies the outcome of a pull. On error the counterpart keeps its
    /// previous value. Returns whether the position was updated.
    pub fn apply_pull(&mut self, result: Result<Position, AppError>) -> bool {
        REMOTE_PULLS.inc();
        let counterpart = self.local_role.counterpart();
        match result.and_then(Position::validate) {
            Ok(position) => {
                self.positions.set(counterpart, position);
                self.recompute();
                true
            }
            Err(err) => {
                REMOTE_PULL_FAILURES.inc();
                error!("Error pulling {} location : {}", counterpart, err);
                false
            }
        }
    }

    fn recompute(&mut self) {
        let route = self.positions.route_state();
        let distance_km = route.as_ref().map(|route| self.distance.report(route));
        self.state_tx.send_replace(SyncState {
            positions: self.positions.clone(),
            route,
            distance_km,
        });
    }
}
