// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

//! Selection/filter state shared by the discover list and map.
//!
//! The controller is the single owner of the active filter and the selected
//! lot. Every state-changing operation reconciles the selection against the
//! visible subset and then publishes an immutable [`DiscoverSnapshot`] to
//! subscribers, so the list and the map always render from the same state.

use crate::filter::{self, LotFilter, UnderutilizedThresholds};
use crate::model::ParkingLot;
use log::{debug, info};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use thiserror::Error;

/// Zoom level the map uses when centering on a selected lot.
pub const FOCUS_ZOOM: u8 = 14;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Parking lot {0} is not in the visible list")]
    NotVisible(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: i64,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFocus {
    pub lot_id: i64,
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

impl MapFocus {
    fn on(lot: &ParkingLot) -> Self {
        Self {
            lot_id: lot.id,
            lat: lot.latitude,
            lng: lot.longitude,
            zoom: FOCUS_ZOOM,
        }
    }
}

/// Everything a view needs to render the discover page.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverSnapshot {
    pub filter: LotFilter,
    pub visible: Vec<ParkingLot>,
    pub selected: Option<ParkingLot>,
    pub total: usize,
    pub underutilized: usize,
}

impl DiscoverSnapshot {
    pub fn markers(&self) -> Vec<MapMarker> {
        let selected_id = self.selected.as_ref().map(|l| l.id);
        self.visible
            .iter()
            .map(|lot| MapMarker {
                id: lot.id,
                name: lot.name.clone(),
                lat: lot.latitude,
                lng: lot.longitude,
                selected: Some(lot.id) == selected_id,
            })
            .collect()
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.as_ref().is_some_and(|l| l.id == id)
    }
}

#[derive(Debug, Clone)]
pub enum DiscoverEvent {
    Changed(Arc<DiscoverSnapshot>),
    CenterOn(MapFocus),
}

pub struct DiscoverController {
    lots: Vec<ParkingLot>,
    filter: LotFilter,
    selected: Option<i64>,
    thresholds: UnderutilizedThresholds,
    subscribers: Vec<Sender<DiscoverEvent>>,
}

impl DiscoverController {
    /// Builds the controller and selects the first visible lot, if any.
    pub fn new(lots: Vec<ParkingLot>, filter: LotFilter, thresholds: UnderutilizedThresholds) -> Self {
        let mut controller = Self {
            lots,
            filter,
            selected: None,
            thresholds,
            subscribers: Vec::new(),
        };
        controller.reconcile();
        controller
    }

    pub fn filter(&self) -> LotFilter {
        self.filter
    }

    pub fn lots(&self) -> &[ParkingLot] {
        &self.lots
    }

    pub fn visible(&self) -> Vec<&ParkingLot> {
        filter::visible(self.filter, &self.lots, &self.thresholds)
    }

    pub fn selected(&self) -> Option<&ParkingLot> {
        let id = self.selected?;
        self.lots.iter().find(|lot| lot.id == id)
    }

    pub fn subscribe(&mut self) -> Receiver<DiscoverEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn set_filter(&mut self, filter: LotFilter) {
        if self.filter == filter {
            debug!("set_filter: unchanged — filter={}", filter);
            return;
        }
        info!("Discover filter changed — from={} to={}", self.filter, filter);
        self.filter = filter;
        self.apply();
    }

    /// Selects a lot from the visible subset. Fails without touching state
    /// when `id` is filtered out or unknown.
    pub fn select_lot(&mut self, id: i64) -> Result<(), SelectionError> {
        let focus = self
            .visible()
            .into_iter()
            .find(|lot| lot.id == id)
            .map(MapFocus::on)
            .ok_or(SelectionError::NotVisible(id))?;

        let changed = self.selected != Some(id);
        self.selected = Some(id);
        // Re-centering is requested even when the lot was already selected.
        self.publish(DiscoverEvent::CenterOn(focus));
        if changed {
            debug!("Selected parking lot — id={}", id);
            self.publish_snapshot();
        }
        Ok(())
    }

    /// Map marker clicks go through the same rules as list clicks.
    pub fn on_marker_click(&mut self, id: i64) -> Result<(), SelectionError> {
        self.select_lot(id)
    }

    pub fn on_data_refreshed(&mut self, lots: Vec<ParkingLot>) {
        if lots == self.lots {
            debug!("on_data_refreshed: lot list unchanged — count={}", lots.len());
            return;
        }
        info!(
            "Parking lot data refreshed — previous={} current={}",
            self.lots.len(),
            lots.len()
        );
        self.lots = lots;
        self.apply();
    }

    pub fn snapshot(&self) -> DiscoverSnapshot {
        DiscoverSnapshot {
            filter: self.filter,
            visible: self.visible().into_iter().cloned().collect(),
            selected: self.selected().cloned(),
            total: self.lots.len(),
            underutilized: filter::underutilized_count(&self.lots, &self.thresholds),
        }
    }

    fn apply(&mut self) {
        let previous = self.selected;
        self.reconcile();
        if self.selected != previous {
            if let Some(focus) = self.selected().map(MapFocus::on) {
                self.publish(DiscoverEvent::CenterOn(focus));
            }
        }
        self.publish_snapshot();
    }

    /// Keeps the selection if it is still visible, otherwise falls back to
    /// the first visible lot (or nothing).
    fn reconcile(&mut self) {
        let visible = self.visible();
        let still_visible = self
            .selected
            .is_some_and(|id| visible.iter().any(|lot| lot.id == id));
        if !still_visible {
            let next = visible.first().map(|lot| lot.id);
            debug!(
                "Selection reconciled — previous={:?} next={:?} visible={}",
                self.selected,
                next,
                visible.len()
            );
            self.selected = next;
        }
    }

    fn publish_snapshot(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = Arc::new(self.snapshot());
        self.publish(DiscoverEvent::Changed(snapshot));
    }

    fn publish(&mut self, event: DiscoverEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
