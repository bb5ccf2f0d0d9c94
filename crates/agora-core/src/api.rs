// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

use crate::model::{ParkingLot, ParkingLotDetail, Project, ProjectRequest};
use log::{debug, info, warn};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const USER_AGENT: &str = concat!("agora-discover/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Invalid parking lot ID: {0}")]
    InvalidId(i64),
}

impl ApiError {
    /// Transport failures and server-side (5xx) errors may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Text shown to the user in place of the failed view.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { resource } => format!("{} not found.", resource),
            ApiError::InvalidId(_) => "Invalid parking lot ID.".to_string(),
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Http { status, .. } => format!("The server returned an error ({}).", status),
            ApiError::Transport(_) => {
                "Could not reach the Agora API. Check your connection and try again.".to_string()
            }
            ApiError::Decode { .. } => "The server sent an unexpected response.".to_string(),
            ApiError::InvalidUrl(_) => "The API address is misconfigured.".to_string(),
        }
    }
}

/// Thin typed wrapper over the Agora REST backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base: normalize_base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /parking-lots/`
    pub fn list_parking_lots(&self) -> Result<Vec<ParkingLot>, ApiError> {
        let endpoint = "parking-lots/";
        let (status, body) = self.send(self.http.get(self.url(endpoint)?), endpoint)?;
        if !status.is_success() {
            return Err(http_error(status, &body));
        }
        let lots: Vec<ParkingLot> = decode(endpoint, &body)?;
        debug!("Fetched parking lots — count={}", lots.len());
        Ok(lots)
    }

    /// `GET /parking-lots/{id}`; a 404 becomes [`ApiError::NotFound`].
    pub fn get_parking_lot(&self, id: i64) -> Result<ParkingLotDetail, ApiError> {
        let endpoint = format!("parking-lots/{}", id);
        let (status, body) = self.send(self.http.get(self.url(&endpoint)?), &endpoint)?;
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                resource: "Parking lot",
            });
        }
        if !status.is_success() {
            return Err(http_error(status, &body));
        }
        decode(&endpoint, &body)
    }

    /// `GET /projects/by-parking-lot/{id}`; a 404 means no project has been
    /// requested yet and is returned as `Ok(None)`.
    pub fn get_project_for_parking_lot(&self, id: i64) -> Result<Option<Project>, ApiError> {
        let endpoint = format!("projects/by-parking-lot/{}", id);
        let (status, body) = self.send(self.http.get(self.url(&endpoint)?), &endpoint)?;
        if status == StatusCode::NOT_FOUND {
            debug!("No project yet — parking_lot_id={}", id);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(http_error(status, &body));
        }
        decode(&endpoint, &body).map(Some)
    }

    /// `POST /projects/request`; creates a pending project for the lot.
    pub fn request_project(&self, id: i64) -> Result<Project, ApiError> {
        let endpoint = "projects/request";
        let request = self
            .http
            .post(self.url(endpoint)?)
            .json(&ProjectRequest { parking_lot_id: id });
        let (status, body) = self.send(request, endpoint)?;
        if !status.is_success() {
            let err = http_error(status, &body);
            warn!("Project request rejected — parking_lot_id={} error={}", id, err);
            return Err(err);
        }
        let project: Project = decode(endpoint, &body)?;
        info!(
            "Project requested — parking_lot_id={} project_id={} status={:?}",
            id, project.id, project.status
        );
        Ok(project)
    }

    /// `GET /users/me` with a bearer token so the backend links the wallet
    /// identity to a user row. The response body is not consumed.
    pub fn sync_user(&self, token: &str) -> Result<(), ApiError> {
        let endpoint = "users/me";
        let request = self.http.get(self.url(endpoint)?).bearer_auth(token);
        let (status, body) = self.send(request, endpoint)?;
        if !status.is_success() {
            return Err(http_error(status, &body));
        }
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<(StatusCode, String), ApiError> {
        let response = request.send().map_err(|e| {
            warn!("Request failed — endpoint={} error={}", endpoint, e);
            ApiError::Transport(e)
        })?;
        let status = response.status();
        let body = response.text()?;
        debug!(
            "API response — endpoint={} status={} bytes={}",
            endpoint,
            status.as_u16(),
            body.len()
        );
        Ok((status, body))
    }
}

/// Makes sure the base keeps its path when joined (`/api` -> `/api/`).
fn normalize_base(raw: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(raw.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn http_error(status: StatusCode, body: &str) -> ApiError {
    ApiError::Http {
        status: status.as_u16(),
        message: server_message(status, body),
    }
}

/// FastAPI reports failures as `{"detail": ...}`; fall back to the raw body,
/// then to the status' reason phrase.
fn server_message(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return match parsed.detail {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}
