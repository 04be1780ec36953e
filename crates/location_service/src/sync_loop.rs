/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    action::{
        route::RouteView,
        sync::{LocationSync, SyncState},
    },
    common::types::{PartyRole, Position},
    map::{MapSnapshot, MapWidget, TileLayer},
    outbound::external::RemoteLocationStore,
    position::{PositionSource, PositionWatch},
    tools::{error::AppError, prometheus::POSITION_ERRORS},
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{
        mpsc::{self, UnboundedSender},
        oneshot, watch,
    },
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_stream::StreamExt;
use tracing::*;

fn spawn_pull(
    store: Arc<dyn RemoteLocationStore>,
    pulled_tx: UnboundedSender<Result<Position, AppError>>,
) {
    tokio::spawn(async move {
        let result = store.get_counterpart_position().await;
        if pulled_tx.send(result).is_err() {
            debug!("Sync loop gone, discarding pull result");
        }
    });
}

/// Drives `sync` until `shutdown_rx` fires or its sender is dropped.
///
/// Fixes are applied in delivery order. Pulls start on every tick, the first
/// one immediately, and run on their own tasks. Their results come back
/// through a channel and are applied in arrival order. Nothing awaited here
/// waits on the network, so a slow store never holds up fix delivery.
pub async fn run_location_sync(
    mut sync: LocationSync,
    mut position_watch: PositionWatch,
    pull_interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> LocationSync {
    let (pulled_tx, mut pulled_rx) = mpsc::unbounded_channel();
    let mut pull_ticker = interval(pull_interval);
    pull_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut watching = true;

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                info!("Location sync deactivated");
                break;
            }
            event = position_watch.next(), if watching => match event {
                Some(Ok(position)) => sync.on_local_fix(position),
                Some(Err(err)) => {
                    POSITION_ERRORS.inc();
                    error!("Error getting location : {}", err);
                }
                None => {
                    warn!("Position watch ended, no further local fixes");
                    watching = false;
                }
            },
            _ = pull_ticker.tick() => spawn_pull(sync.store(), pulled_tx.clone()),
            Some(result) = pulled_rx.recv() => {
                sync.apply_pull(result);
            }
        }
    }

    position_watch.unsubscribe();
    sync
}

/// Renders every published `SyncState` and republishes the resulting map.
/// Returns once the `LocationSync` publishing the states is dropped.
pub async fn run_route_renderer<M: MapWidget>(
    mut route_view: RouteView<M>,
    mut state_rx: watch::Receiver<SyncState>,
    map_tx: watch::Sender<MapSnapshot>,
) {
    let mut centered_on: Option<Position> = None;

    while state_rx.changed().await.is_ok() {
        let state = state_rx.borrow_and_update().clone();

        if let Some(parent) = state.positions.position(PartyRole::Parent) {
            if centered_on != Some(parent) {
                route_view.center_on(parent);
                centered_on = Some(parent);
            }
        }
        if let Some(route) = state.route {
            route_view.update_route(&route).await;
        }

        map_tx.send_replace(route_view.map().snapshot());
    }
    debug!("Route renderer stopped");
}

pub struct SyncSettings {
    pub pull_interval: Duration,
    pub tile_layer: TileLayer,
}

/// A running sync: the event loop plus the route renderer.
pub struct ActiveSync {
    shutdown_tx: oneshot::Sender<()>,
    sync_handle: JoinHandle<LocationSync>,
    renderer_handle: JoinHandle<()>,
}

/// Sets up the map, subscribes to `source` and starts pulling. A zero pull
/// interval is rejected before anything is subscribed.
pub fn activate<S, M>(
    source: &mut S,
    sync: LocationSync,
    mut route_view: RouteView<M>,
    settings: SyncSettings,
    map_tx: watch::Sender<MapSnapshot>,
) -> Result<ActiveSync, AppError>
where
    S: PositionSource + ?Sized,
    M: MapWidget + 'static,
{
    if settings.pull_interval.is_zero() {
        return Err(AppError::InvalidRequest(
            "pull interval must be non-zero".to_string(),
        ));
    }
    let position_watch = source.subscribe()?;

    route_view.initialize(settings.tile_layer);
    map_tx.send_replace(route_view.map().snapshot());

    let renderer_handle = tokio::spawn(run_route_renderer(
        route_view,
        sync.subscribe(),
        map_tx,
    ));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let sync_handle = tokio::spawn(run_location_sync(
        sync,
        position_watch,
        settings.pull_interval,
        shutdown_rx,
    ));

    info!(pull_interval = ?settings.pull_interval, "Location sync activated");

    Ok(ActiveSync {
        shutdown_tx,
        sync_handle,
        renderer_handle,
    })
}

impl ActiveSync {
    /// Unsubscribes from the position source and stops pulling. Requests
    /// already in flight are left to finish and their results are dropped.
    pub async fn deactivate(self) -> Result<SyncState, AppError> {
        let _ = self.shutdown_tx.send(());
        let sync = self
            .sync_handle
            .await
            .map_err(|err| AppError::InternalError(format!("Sync loop failed : {err}")))?;
        let final_state = sync.state();
        drop(sync);

        self.renderer_handle
            .await
            .map_err(|err| AppError::InternalError(format!("Route renderer failed : {err}")))?;

        Ok(final_state)
    }
}
