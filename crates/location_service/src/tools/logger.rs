/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use serde::Deserialize;
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

pub const SERVICE_NAME: &str = "location-service";

#[derive(Debug, Deserialize, Clone)]
pub struct LoggerConfig {
    pub level: String,
    pub log_to_file: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: Level::INFO.to_string(),
            log_to_file: false,
        }
    }
}

/// Installs the global subscriber. Keep the returned guard alive for as long
/// as logs should be flushed.
pub fn setup_tracing(logger_cfg: LoggerConfig) -> WorkerGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logger_cfg.level.to_lowercase()));

    let (non_blocking_writer, guard) = if logger_cfg.log_to_file {
        tracing_appender::non_blocking(rolling::hourly("./logs", SERVICE_NAME))
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(
            SERVICE_NAME.to_string(),
            non_blocking_writer,
        ));

    tracing::subscriber::set_global_default(subscriber)
        .expect("Unable to set global tracing subscriber");

    guard
}
