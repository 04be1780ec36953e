/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::tools::prometheus::CALL_EXTERNAL_API;
use crate::call_external_api;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, Method, Response, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use std::str::FromStr;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum CallApiError {
    #[error("Header serialization failed : {0}")]
    HeaderSerializationFailed(String),
    #[error("Response deserialization failed : {0}")]
    ResponseDeserializationFailed(String),
    #[error("Connection error : {0}")]
    ConnectionError(String),
    #[error("Body serialization failed : {0}")]
    BodySerializationFailed(String),
    #[error("External API call failed with status : {}", .0.status())]
    ExternalAPICallError(Response),
}

fn build_headers(headers: Vec<(&str, &str)>) -> Result<HeaderMap, CallApiError> {
    headers
        .into_iter()
        .map(|(key, value)| -> Result<(HeaderName, HeaderValue), CallApiError> {
            let name = HeaderName::from_str(key)
                .map_err(|err| CallApiError::HeaderSerializationFailed(err.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| CallApiError::HeaderSerializationFailed(err.to_string()))?;
            Ok((name, value))
        })
        .collect()
}

/// Origin label used for the latency histogram, e.g. `http://host:80`.
fn api_origin(url: &Url) -> String {
    format!(
        "{}://{}:{}",
        url.scheme(),
        url.host_str().unwrap_or(""),
        url.port_or_known_default().unwrap_or(80)
    )
}

/// Sends a JSON request and decodes a JSON response. Only the size of the
/// request body is logged since it carries the caller's coordinates.
pub async fn call_api<T, U>(
    client: &Client,
    method: Method,
    url: &Url,
    headers: Vec<(&str, &str)>,
    body: Option<U>,
) -> Result<T, CallApiError>
where
    T: DeserializeOwned,
    U: Serialize,
{
    let start_time = std::time::Instant::now();

    let mut request = client
        .request(method.clone(), url.clone())
        .headers(build_headers(headers)?);

    let mut body_len = 0;
    if let Some(body) = &body {
        let body = serde_json::to_string(body)
            .map_err(|err| CallApiError::BodySerializationFailed(err.to_string()))?;
        body_len = body.len();
        request = request.body(body);
    }

    let resp = request.send().await;

    let status = match &resp {
        Ok(resp) => resp.status().as_str().to_string(),
        Err(err) => err
            .status()
            .map(|status| status.to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
    };
    call_external_api!(
        method.as_str(),
        api_origin(url).as_str(),
        url.path(),
        status.as_str(),
        start_time
    );
    let latency = format!("{}ms", start_time.elapsed().as_millis());

    match resp {
        Ok(resp) if resp.status().is_success() => {
            info!(tag = "[OUTGOING API]", request_method = %method, request_url = %url, body_len, response_status = %resp.status(), latency);
            resp.json::<T>()
                .await
                .map_err(|err| CallApiError::ResponseDeserializationFailed(err.to_string()))
        }
        Ok(resp) => {
            error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_url = %url, body_len, response_status = %resp.status(), latency);
            Err(CallApiError::ExternalAPICallError(resp))
        }
        Err(err) => {
            error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_url = %url, body_len, error = %err, latency);
            Err(CallApiError::ConnectionError(err.to_string()))
        }
    }
}
