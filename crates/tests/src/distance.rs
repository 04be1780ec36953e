/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

#[test]
fn distance_from_a_point_to_itself_is_zero() {
    use crate::mocks::position;
    use location_service::action::distance::DistanceMonitor;

    for latitude in [-90.0, -45.5, 0.0, 12.9716, 89.999] {
        for longitude in [-180.0, -77.0, 0.0, 77.5946, 180.0] {
            let p = position(latitude, longitude);
            assert_eq!(DistanceMonitor::compute(&p, &p), 0.0);
        }
    }
}

#[test]
fn distance_is_symmetric() {
    use crate::mocks::position;
    use location_service::action::distance::DistanceMonitor;

    let points = [
        position(12.9716, 77.5946),
        position(28.7041, 77.1025),
        position(-33.8688, 151.2093),
        position(40.7128, -74.006),
        position(0.0, 0.0),
        position(-89.5, 179.0),
    ];
    for a in points {
        for b in points {
            assert_eq!(
                DistanceMonitor::compute(&a, &b),
                DistanceMonitor::compute(&b, &a)
            );
        }
    }
}

#[test]
fn quarter_of_the_equator() {
    use crate::mocks::position;
    use location_service::action::distance::DistanceMonitor;

    let d = DistanceMonitor::compute(&position(0.0, 0.0), &position(0.0, 90.0));
    assert!((d - 10007.5).abs() < 0.1, "got {d}");
}

#[test]
fn report_remembers_the_last_distance() {
    use crate::mocks::position;
    use location_service::{action::distance::DistanceMonitor, common::types::RouteState};

    let mut monitor = DistanceMonitor::new();
    assert_eq!(monitor.last_km(), None);

    let route = RouteState {
        parent: position(12.9716, 77.5946),
        child: position(13.0827, 80.2707),
    };
    let reported = monitor.report(&route);
    assert_eq!(monitor.last_km(), Some(reported));
    assert!((reported - 290.2).abs() < 1.0, "got {reported}");
}
