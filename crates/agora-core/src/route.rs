// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

use crate::filter::LotFilter;
use log::warn;
use thiserror::Error;
use url::form_urlencoded;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Invalid parking lot ID: '{0}'")]
    InvalidLotId(String),
}

impl RouteError {
    pub fn user_message(&self) -> &'static str {
        match self {
            RouteError::InvalidLotId(_) => "Invalid parking lot ID.",
        }
    }
}

/// Navigation state of the discover page that survives a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscoverRoute {
    pub filter: LotFilter,
}

impl DiscoverRoute {
    /// Parses `filter=...` from a query string (with or without the `?`).
    /// A missing or unknown value means [`LotFilter::All`].
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let raw = form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "filter")
            .map(|(_, value)| value.into_owned());

        let filter = match raw {
            None => LotFilter::All,
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!("Ignoring filter query parameter — {}", e);
                LotFilter::All
            }),
        };
        Self { filter }
    }

    /// Query string for this route; empty for the unfiltered view.
    pub fn to_query(&self) -> String {
        match self.filter {
            LotFilter::All => String::new(),
            filter => form_urlencoded::Serializer::new(String::new())
                .append_pair("filter", filter.as_str())
                .finish(),
        }
    }

    pub fn path(&self) -> String {
        match self.to_query() {
            q if q.is_empty() => "/discover".to_string(),
            q => format!("/discover?{}", q),
        }
    }
}

pub fn lot_path(id: i64) -> String {
    format!("/discover/{}", id)
}

/// Parses the `{id}` path segment of a lot detail page.
pub fn parse_lot_id(raw: &str) -> Result<i64, RouteError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(RouteError::InvalidLotId(raw.to_string())),
    }
}
