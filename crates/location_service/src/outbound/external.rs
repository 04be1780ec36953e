/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use crate::{
    common::types::{PartyRole, Position},
    tools::{
        callapi::{call_api, CallApiError},
        error::AppError,
    },
};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use tracing::*;

/// Remote store holding one position per role.
#[async_trait]
pub trait RemoteLocationStore: Send + Sync {
    async fn set_position(&self, role: PartyRole, position: Position) -> Result<(), AppError>;

    /// The store is not scoped by role on read; whatever it returns is the
    /// counterpart.
    async fn get_counterpart_position(&self) -> Result<Position, AppError>;
}

#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, position: &Position) -> Result<String, AppError>;
}

pub struct HttpLocationStore {
    client: Client,
    url: Url,
}

impl HttpLocationStore {
    pub fn new(client: Client, url: Url) -> Self {
        HttpLocationStore { client, url }
    }
}

#[async_trait]
impl RemoteLocationStore for HttpLocationStore {
    async fn set_position(&self, role: PartyRole, position: Position) -> Result<(), AppError> {
        let resp = call_api::<serde_json::Value, PositionPayload>(
            &self.client,
            Method::POST,
            &self.url,
            vec![("content-type", "application/json")],
            Some(PositionPayload::new(role, position)),
        )
        .await
        .map_err(|err| AppError::NetworkFailure(err.to_string()))?;

        debug!(tag = "[LOCATION PUSH]", %role, response = %resp);
        Ok(())
    }

    async fn get_counterpart_position(&self) -> Result<Position, AppError> {
        let resp = call_api::<CounterpartPosition, ()>(
            &self.client,
            Method::GET,
            &self.url,
            vec![("accept", "application/json")],
            None,
        )
        .await
        .map_err(|err| AppError::NetworkFailure(err.to_string()))?;

        Position::from(resp).validate()
    }
}

pub struct NominatimGeocoder {
    client: Client,
    url: Url,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, url: Url, user_agent: String) -> Self {
        NominatimGeocoder {
            client,
            url,
            user_agent,
        }
    }

    fn reverse_url(&self, position: &Position) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &position.latitude.to_string())
            .append_pair("lon", &position.longitude.to_string());
        url
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, position: &Position) -> Result<String, AppError> {
        let resp = call_api::<ReverseGeocodeResponse, ()>(
            &self.client,
            Method::GET,
            &self.reverse_url(position),
            vec![("user-agent", self.user_agent.as_str())],
            None,
        )
        .await;

        match resp {
            Ok(ReverseGeocodeResponse {
                display_name: Some(address),
            }) => Ok(address),
            Ok(ReverseGeocodeResponse { display_name: None }) => Err(AppError::GeocodeFailure(
                "display_name missing from response".to_string(),
            )),
            Err(CallApiError::ExternalAPICallError(resp)) => Err(AppError::GeocodeFailure(
                format!("geocoder responded with {}", resp.status()),
            )),
            Err(err) => Err(AppError::GeocodeFailure(err.to_string())),
        }
    }
}
