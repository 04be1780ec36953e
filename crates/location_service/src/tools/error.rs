/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Position unavailable : {0}")]
    PositionUnavailable(String),
    #[error("Timed out waiting for a position fix")]
    Timeout,
    #[error("Position source already subscribed")]
    AlreadySubscribed,
    #[error("Invalid coordinates : ({0}, {1})")]
    InvalidCoordinates(f64, f64),
    #[error("Network failure : {0}")]
    NetworkFailure(String),
    #[error("Reverse geocoding failed : {0}")]
    GeocodeFailure(String),
    #[error("Not found : {0}")]
    NotFound(String),
    #[error("Invalid request : {0}")]
    InvalidRequest(String),
    #[error("Internal error : {0}")]
    InternalError(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::PermissionDenied => "PERMISSION_DENIED",
            AppError::PositionUnavailable(_) => "POSITION_UNAVAILABLE",
            AppError::Timeout => "TIMEOUT",
            AppError::AlreadySubscribed => "ALREADY_SUBSCRIBED",
            AppError::InvalidCoordinates(..) => "INVALID_COORDINATES",
            AppError::NetworkFailure(_) => "NETWORK_FAILURE",
            AppError::GeocodeFailure(_) => "GEOCODE_FAILURE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Errors after which a position watch delivers nothing more.
    pub fn ends_position_stream(&self) -> bool {
        matches!(
            self,
            AppError::PermissionDenied | AppError::PositionUnavailable(_)
        )
    }
}

#[derive(Serialize, Debug)]
struct ErrorBody {
    error_code: &'static str,
    error_message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::InvalidCoordinates(..) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NetworkFailure(_) | AppError::GeocodeFailure(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error_code: self.code(),
            error_message: self.to_string(),
        })
    }
}
