// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

use crate::api::{ApiClient, ApiError};
use crate::model::{ParkingLot, ParkingLotDetail, Project};
use crate::query::{QueryCache, QueryKey, QueryOptions};
use log::info;
use std::sync::Arc;

/// Cached access to the backend, one cache per record type.
pub struct QueryClient {
    api: ApiClient,
    lots: QueryCache<Vec<ParkingLot>>,
    details: QueryCache<ParkingLotDetail>,
    projects: QueryCache<Option<Project>>,
}

impl QueryClient {
    pub fn new(api: ApiClient, options: QueryOptions) -> Self {
        Self {
            api,
            lots: QueryCache::new(options),
            details: QueryCache::new(options),
            projects: QueryCache::new(options),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn parking_lots(&self) -> Result<Arc<Vec<ParkingLot>>, ApiError> {
        self.lots
            .fetch(QueryKey::ParkingLots, || self.api.list_parking_lots())
    }

    /// Forces a new list fetch, e.g. for a manual refresh.
    pub fn refresh_parking_lots(&self) -> Result<Arc<Vec<ParkingLot>>, ApiError> {
        self.lots
            .refetch(QueryKey::ParkingLots, || self.api.list_parking_lots())
    }

    pub fn parking_lot(&self, id: i64) -> Result<Arc<ParkingLotDetail>, ApiError> {
        ensure_valid_id(id)?;
        self.details
            .fetch(QueryKey::ParkingLotDetail(id), || self.api.get_parking_lot(id))
    }

    pub fn project_for_parking_lot(&self, id: i64) -> Result<Arc<Option<Project>>, ApiError> {
        ensure_valid_id(id)?;
        self.projects.fetch(QueryKey::ProjectByParkingLot(id), || {
            self.api.get_project_for_parking_lot(id)
        })
    }

    /// Creates a project for the lot and invalidates its cached project
    /// lookup so the next read sees the new project.
    pub fn request_project(&self, id: i64) -> Result<Project, ApiError> {
        ensure_valid_id(id)?;
        let project = self.api.request_project(id)?;
        self.projects.invalidate(&QueryKey::ProjectByParkingLot(id));
        info!(
            "Project lookup invalidated after request — parking_lot_id={} project_id={}",
            id, project.id
        );
        Ok(project)
    }

    pub fn cached_project(&self, id: i64) -> Option<Arc<Option<Project>>> {
        self.projects.get(&QueryKey::ProjectByParkingLot(id))
    }

    pub fn is_project_fresh(&self, id: i64) -> bool {
        self.projects.is_fresh(&QueryKey::ProjectByParkingLot(id))
    }

    pub fn clear(&self) {
        self.lots.clear();
        self.details.clear();
        self.projects.clear();
    }
}

fn ensure_valid_id(id: i64) -> Result<(), ApiError> {
    if id > 0 {
        Ok(())
    } else {
        Err(ApiError::InvalidId(id))
    }
}
