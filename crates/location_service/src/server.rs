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
    common::types::PartyRole,
    environment::{AppConfig, AppState},
    map::{InMemoryMap, MapSnapshot},
    position::LinesPositionSource,
    sync_loop::{activate, SyncSettings},
    tools::{error::AppError, logger::setup_tracing, prometheus::prometheus_metrics},
};
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::{env::var, net::Ipv4Addr, str::FromStr};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::{oneshot, watch},
};
use tracing::*;

/// Read side of the sync and map channels, shared with the HTTP handlers.
#[derive(Clone)]
pub struct StatusChannels {
    sync_rx: watch::Receiver<SyncState>,
    map_rx: watch::Receiver<MapSnapshot>,
}

impl StatusChannels {
    pub fn new(sync_rx: watch::Receiver<SyncState>, map_rx: watch::Receiver<MapSnapshot>) -> Self {
        StatusChannels { sync_rx, map_rx }
    }
}

#[derive(Serialize)]
struct StatusResponse {
    sync: SyncState,
    map: MapSnapshot,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("Location Service Is Up!")
}

async fn state(channels: web::Data<StatusChannels>) -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        sync: channels.sync_rx.borrow().clone(),
        map: channels.map_rx.borrow().clone(),
    })
}

async fn party_location(
    channels: web::Data<StatusChannels>,
    role: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let role = PartyRole::from_str(role.as_str())
        .map_err(|_| AppError::InvalidRequest(format!("Unknown role {:?}", role.as_str())))?;
    let record = channels
        .sync_rx
        .borrow()
        .positions
        .get(role)
        .copied()
        .ok_or_else(|| AppError::NotFound(format!("No {role} location yet")))?;
    Ok(HttpResponse::Ok().json(record))
}

/// Registers `/health`, `/state` and `/location/{role}` on top of `channels`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, channels: StatusChannels) {
    cfg.app_data(web::Data::new(channels))
        .route("/health", web::get().to(health))
        .route("/state", web::get().to(state))
        .route("/location/{role}", web::get().to(party_location));
}

pub async fn run_server() -> Result<()> {
    let dhall_config_path = var("DHALL_CONFIG")
        .unwrap_or_else(|_| "./dhall-configs/dev/location_service.dhall".to_string());
    let app_config = serde_dhall::from_file(dhall_config_path).parse::<AppConfig>()?;

    let _guard = setup_tracing(app_config.logger_cfg.clone());

    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic Occured : {:?}", panic_info);
    }));

    let app_state = AppState::new(app_config)?;

    let (sync_tx, sync_rx) = watch::channel(SyncState::default());
    let (map_tx, map_rx) = watch::channel(MapSnapshot::default());

    let sync = LocationSync::new(app_state.location_store.clone(), sync_tx);
    let route_view = RouteView::new(
        InMemoryMap::new(),
        app_state.geocoder.clone(),
        app_state.zoom,
    );
    let mut position_source =
        LinesPositionSource::new(tokio::io::stdin(), app_state.position_buffer);

    let active_sync = activate(
        &mut position_source,
        sync,
        route_view,
        SyncSettings {
            pull_interval: app_state.pull_interval,
            tile_layer: app_state.tile_layer.clone(),
        },
        map_tx,
    )?;

    let (signal_tx, signal_rx) = oneshot::channel();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                error!("SIGTERM received: shutting down");
                let _ = signal_tx.send(());
            },
            _ = sigint.recv() => {
                error!("SIGINT received: shutting down");
                let _ = signal_tx.send(());
            }
        }
    });

    let channels = StatusChannels::new(sync_rx, map_rx);
    let prometheus = prometheus_metrics();
    let http_server = HttpServer::new(move || {
        App::new()
            .wrap(prometheus.clone())
            .configure(|cfg| configure_routes(cfg, channels.clone()))
    })
    .bind((Ipv4Addr::UNSPECIFIED, app_state.http_server_port))?
    .disable_signals()
    .shutdown_timeout(5)
    .run();
    let http_server_handle = http_server.handle();

    tokio::select! {
        res = http_server => {
            error!("[HTTP_SERVER_ENDED] : {:?}", res);
            Err(anyhow!("[HTTP_SERVER] : {:?}", res))
        }
        _ = signal_rx => {
            let final_state = active_sync.deactivate().await?;
            info!(
                distance_km = ?final_state.distance_km,
                "Location sync stopped"
            );
            http_server_handle.stop(true).await;
            Ok(())
        }
    }
}
