/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{
    opts, register_gauge, register_histogram_vec, register_int_counter, Gauge, HistogramVec,
    IntCounter,
};

pub static LOCAL_FIXES: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("local_fixes", "Local Position Fixes")
        .expect("Failed to register local fixes metrics")
});

pub static POSITION_ERRORS: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("position_errors", "Position Source Errors")
        .expect("Failed to register position errors metrics")
});

pub static REMOTE_PUSH_FAILURES: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("remote_push_failures", "Remote Push Failures")
            .expect("Failed to register remote push failures metrics")
    });

pub static REMOTE_PULLS: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("remote_pulls", "Remote Pulls")
        .expect("Failed to register remote pulls metrics")
});

pub static REMOTE_PULL_FAILURES: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("remote_pull_failures", "Remote Pull Failures")
            .expect("Failed to register remote pull failures metrics")
    });

pub static GEOCODE_FAILURES: once_cell::sync::Lazy<IntCounter> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter!("geocode_failures", "Reverse Geocoding Failures")
            .expect("Failed to register geocode failures metrics")
    });

pub static ROUTE_UPDATES: once_cell::sync::Lazy<IntCounter> = once_cell::sync::Lazy::new(|| {
    register_int_counter!("route_updates", "Route Updates")
        .expect("Failed to register route updates metrics")
});

pub static SEPARATION_KM: once_cell::sync::Lazy<Gauge> = once_cell::sync::Lazy::new(|| {
    register_gauge!(opts!("separation_km", "Parent To Child Distance In Kilometers"))
        .expect("Failed to register separation metrics")
});

pub static CALL_EXTERNAL_API: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            opts!("external_request_duration", "Call external API requests").into(),
            &["method", "host", "service", "status"]
        )
        .expect("Failed to register call external API metrics")
    });

#[macro_export]
macro_rules! call_external_api {
    ($method:expr, $host:expr, $path:expr, $status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        CALL_EXTERNAL_API
            .with_label_values(&[$method, $host, $path, $status])
            .observe(duration);
    };
}

/// Builds the actix middleware that serves `/metrics` and registers the
/// service metrics with its registry.
///
/// # Panics
///
/// * If the middleware cannot be built or a metric cannot be registered.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .buckets(&[
            0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0,
        ])
        .build()
        .expect("Failed to create Prometheus Metrics");

    prometheus
        .registry
        .register(Box::new(LOCAL_FIXES.to_owned()))
        .expect("Failed to register local fixes metrics");

    prometheus
        .registry
        .register(Box::new(POSITION_ERRORS.to_owned()))
        .expect("Failed to register position errors metrics");

    prometheus
        .registry
        .register(Box::new(REMOTE_PUSH_FAILURES.to_owned()))
        .expect("Failed to register remote push failures metrics");

    prometheus
        .registry
        .register(Box::new(REMOTE_PULLS.to_owned()))
        .expect("Failed to register remote pulls metrics");

    prometheus
        .registry
        .register(Box::new(REMOTE_PULL_FAILURES.to_owned()))
        .expect("Failed to register remote pull failures metrics");

    prometheus
        .registry
        .register(Box::new(GEOCODE_FAILURES.to_owned()))
        .expect("Failed to register geocode failures metrics");

    prometheus
        .registry
        .register(Box::new(ROUTE_UPDATES.to_owned()))
        .expect("Failed to register route updates metrics");

    prometheus
        .registry
        .register(Box::new(SEPARATION_KM.to_owned()))
        .expect("Failed to register separation metrics");

    prometheus
        .registry
        .register(Box::new(CALL_EXTERNAL_API.to_owned()))
        .expect("Failed to register call external API metrics");

    prometheus
}
