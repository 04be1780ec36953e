/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

#[tokio::test]
async fn last_fix_wins_and_every_fix_is_pushed_once() -> anyhow::Result<()> {
    use crate::mocks::{position, RecordingStore};
    use location_service::{
        action::sync::{LocationSync, SyncState},
        common::types::PartyRole,
    };
    use std::{sync::Arc, time::Duration};
    use tokio::sync::watch;

    let (store, mut pushed_rx) = RecordingStore::new();
    let (state_tx, _state_rx) = watch::channel(SyncState::default());
    let mut sync = LocationSync::new(Arc::new(store), state_tx);

    let fixes = [
        position(12.9716, 77.5946),
        position(12.9720, 77.5950),
        position(12.9730, 77.5960),
    ];
    for fix in fixes {
        sync.on_local_fix(fix);
    }

    assert_eq!(sync.positions().position(PartyRole::Parent), Some(fixes[2]));

    let mut pushed = Vec::new();
    for _ in 0..fixes.len() {
        let push = tokio::time::timeout(Duration::from_secs(1), pushed_rx.recv())
            .await?
            .ok_or_else(|| anyhow::anyhow!("push channel closed"))?;
        pushed.push(push);
    }
    for fix in fixes {
        assert!(pushed.contains(&(PartyRole::Parent, fix)));
    }

    assert!(
        tokio::time::timeout(Duration::from_millis(100), pushed_rx.recv())
            .await
            .is_err(),
        "more pushes than fixes"
    );

    Ok(())
}

#[tokio::test]
async fn failed_pull_keeps_previous_child_position() -> anyhow::Result<()> {
    use crate::mocks::{position, RecordingStore};
    use location_service::{
        action::sync::{LocationSync, SyncState},
        common::types::PartyRole,
    };
    use std::sync::Arc;
    use tokio::sync::watch;

    let (store, _pushed_rx) = RecordingStore::new();
    let store = Arc::new(store);
    let (state_tx, _state_rx) = watch::channel(SyncState::default());
    let mut sync = LocationSync::new(store.clone(), state_tx);

    let child = position(13.0, 77.6);
    store.set_counterpart(child);
    assert!(sync.pull_remote().await);
    assert_eq!(sync.positions().position(PartyRole::Child), Some(child));

    store.fail_pulls("connection reset");
    assert!(!sync.pull_remote().await);
    assert_eq!(sync.positions().position(PartyRole::Child), Some(child));

    Ok(())
}

#[tokio::test]
async fn pull_with_invalid_coordinates_is_ignored() -> anyhow::Result<()> {
    use crate::mocks::{position, RecordingStore};
    use location_service::{
        action::sync::{LocationSync, SyncState},
        common::types::{PartyRole, RecordState},
    };
    use std::sync::Arc;
    use tokio::sync::watch;

    let (store, _pushed_rx) = RecordingStore::new();
    let store = Arc::new(store);
    let (state_tx, _state_rx) = watch::channel(SyncState::default());
    let mut sync = LocationSync::new(store.clone(), state_tx);

    store.set_counterpart(position(120.0, 10.0));
    assert!(!sync.pull_remote().await);
    assert_eq!(sync.positions().state(PartyRole::Child), RecordState::Unknown);

    Ok(())
}

#[tokio::test]
async fn route_and_distance_wait_for_both_positions() -> anyhow::Result<()> {
    use crate::mocks::{position, RecordingStore};
    use location_service::{
        action::{
            distance::DistanceMonitor,
            sync::{LocationSync, SyncState},
        },
        common::types::RouteState,
    };
    use std::sync::Arc;
    use tokio::sync::watch;

    let (store, _pushed_rx) = RecordingStore::new();
    let store = Arc::new(store);
    let (state_tx, state_rx) = watch::channel(SyncState::default());
    let mut sync = LocationSync::new(store.clone(), state_tx);

    let parent = position(12.9716, 77.5946);
    sync.on_local_fix(parent);
    {
        let state = state_rx.borrow();
        assert_eq!(state.route, None);
        assert_eq!(state.distance_km, None);
    }
    assert_eq!(sync.last_distance_km(), None);

    let child = position(12.9352, 77.6245);
    store.set_counterpart(child);
    assert!(sync.pull_remote().await);

    let state = state_rx.borrow().clone();
    assert_eq!(state.route, Some(RouteState { parent, child }));
    assert_eq!(
        state.distance_km,
        Some(DistanceMonitor::compute(&parent, &child))
    );
    assert_eq!(sync.last_distance_km(), state.distance_km);

    Ok(())
}

#[tokio::test]
async fn push_failure_leaves_local_state_intact() -> anyhow::Result<()> {
    use crate::mocks::{position, RecordingStore};
    use location_service::{
        action::sync::{LocationSync, SyncState},
        common::types::PartyRole,
    };
    use std::{sync::Arc, time::Duration};
    use tokio::sync::watch;

    let (store, mut pushed_rx) = RecordingStore::new();
    let (state_tx, _state_rx) = watch::channel(SyncState::default());
    let mut sync = LocationSync::new(Arc::new(store.failing_pushes()), state_tx);

    let fix = position(51.5074, -0.1278);
    sync.on_local_fix(fix);

    let attempted = tokio::time::timeout(Duration::from_secs(1), pushed_rx.recv()).await?;
    assert_eq!(attempted, Some((PartyRole::Parent, fix)));
    assert!(
        tokio::time::timeout(Duration::from_millis(100), pushed_rx.recv())
            .await
            .is_err(),
        "failed push was retried"
    );
    assert_eq!(sync.positions().position(PartyRole::Parent), Some(fix));

    Ok(())
}

#[tokio::test]
async fn invalid_local_fix_is_dropped() -> anyhow::Result<()> {
    use crate::mocks::{position, RecordingStore};
    use location_service::{
        action::sync::{LocationSync, SyncState},
        common::types::PartyRole,
    };
    use std::{sync::Arc, time::Duration};
    use tokio::sync::watch;

    let (store, mut pushed_rx) = RecordingStore::new();
    let (state_tx, _state_rx) = watch::channel(SyncState::default());
    let mut sync = LocationSync::new(Arc::new(store), state_tx);

    sync.on_local_fix(position(f64::NAN, 0.0));

    assert_eq!(sync.positions().position(PartyRole::Parent), None);
    assert!(
        tokio::time::timeout(Duration::from_millis(100), pushed_rx.recv())
            .await
            .is_err(),
        "invalid fix was pushed"
    );

    Ok(())
}
