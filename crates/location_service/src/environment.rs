/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    map::TileLayer,
    outbound::external::{HttpLocationStore, NominatimGeocoder, RemoteLocationStore, ReverseGeocoder},
    tools::logger::LoggerConfig,
};
use anyhow::{ensure, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    pub tile_url: String,
    pub max_zoom: u8,
    pub zoom: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http_server_port: u16,
    pub logger_cfg: LoggerConfig,
    pub location_store_url: String,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub pull_interval_millis: u64,
    pub request_timeout_millis: u64,
    pub position_buffer: usize,
    pub map_cfg: MapConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub location_store: Arc<dyn RemoteLocationStore>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub pull_interval: Duration,
    pub position_buffer: usize,
    pub http_server_port: u16,
    pub tile_layer: TileLayer,
    pub zoom: u8,
}

impl AppState {
    pub fn new(app_config: AppConfig) -> Result<AppState> {
        ensure!(
            app_config.pull_interval_millis > 0,
            "pull_interval_millis must be greater than 0"
        );

        let client = Client::builder()
            .timeout(Duration::from_millis(app_config.request_timeout_millis))
            .build()?;

        let location_store: Arc<dyn RemoteLocationStore> = Arc::new(HttpLocationStore::new(
            client.clone(),
            Url::parse(app_config.location_store_url.as_str())?,
        ));
        let geocoder: Arc<dyn ReverseGeocoder> = Arc::new(NominatimGeocoder::new(
            client,
            Url::parse(app_config.geocoder_url.as_str())?,
            app_config.geocoder_user_agent,
        ));

        Ok(AppState {
            location_store,
            geocoder,
            pull_interval: Duration::from_millis(app_config.pull_interval_millis),
            position_buffer: app_config.position_buffer,
            http_server_port: app_config.http_server_port,
            tile_layer: TileLayer {
                url_template: app_config.map_cfg.tile_url,
                max_zoom: app_config.map_cfg.max_zoom,
            },
            zoom: app_config.map_cfg.zoom,
        })
    }
}
