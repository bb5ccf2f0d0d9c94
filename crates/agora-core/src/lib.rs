// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

pub mod api;
pub mod auth;
pub mod config;
pub mod discover;
pub mod filter;
pub mod model;
pub mod queries;
pub mod query;
pub mod route;
pub mod view;

pub use api::{ApiClient, ApiError};
pub use config::{get_config_root, Config, ConfigManager};
pub use discover::{DiscoverController, DiscoverEvent, DiscoverSnapshot, SelectionError};
pub use filter::{LotFilter, UnderutilizedThresholds};
pub use model::{Parcel, ParkingLot, ParkingLotDetail, Project};
pub use queries::QueryClient;

/// Builds a cached backend client from a resolved configuration.
pub fn connect(config: &Config) -> Result<QueryClient, ApiError> {
    let api = ApiClient::new(&config.api_url, config.request_timeout())?;
    log::debug!(
        "Connected query client — api_url={} stale_time_secs={}",
        api.base_url(),
        config.query.stale_time.as_secs_f64()
    );
    Ok(QueryClient::new(api, config.query))
}
