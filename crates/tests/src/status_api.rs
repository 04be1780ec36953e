/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{http::StatusCode, test, App};
use location_service::{
    action::sync::SyncState,
    map::MapSnapshot,
    server::{configure_routes, StatusChannels},
};
use serde_json::Value;
use tokio::sync::watch;

#[actix_web::test]
async fn location_lookup_maps_errors_to_status_and_body() {
    use crate::mocks::position;
    use location_service::common::types::{PartyRole, PositionBook};

    let (sync_tx, sync_rx) = watch::channel(SyncState::default());
    let (_map_tx, map_rx) = watch::channel(MapSnapshot::default());
    let channels = StatusChannels::new(sync_rx, map_rx);
    let app = test::init_service(
        App::new().configure(|cfg| configure_routes(cfg, channels.clone())),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/location/grandparent").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "INVALID_REQUEST");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/location/child").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "NOT_FOUND");
    assert_eq!(body["error_message"], "Not found : No child location yet");

    let child = position(12.9352, 77.6245);
    let mut positions = PositionBook::default();
    positions.set(PartyRole::Child, child);
    sync_tx.send_replace(SyncState {
        positions,
        route: None,
        distance_km: None,
    });

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/location/child").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["role"], "child");
    assert_eq!(body["position"]["latitude"], 12.9352);

}

#[actix_web::test]
async fn health_and_state_answer_ok() {
    let (_sync_tx, sync_rx) = watch::channel(SyncState::default());
    let (_map_tx, map_rx) = watch::channel(MapSnapshot::default());
    let channels = StatusChannels::new(sync_rx, map_rx);
    let app = test::init_service(
        App::new().configure(|cfg| configure_routes(cfg, channels.clone())),
    )
    .await;

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/state").to_request()).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert!(body["sync"]["distance_km"].is_null());

}
