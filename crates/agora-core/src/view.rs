// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

//! Plain-text rendering of the discover list, map markers and lot detail.

use crate::discover::DiscoverSnapshot;
use crate::model::{ParkingLot, ParkingLotDetail, Project};
use crate::route::{lot_path, DiscoverRoute};
use std::fmt::Write;

pub const BACK_TO_DISCOVER: &str = "Back to Discover";

pub fn stat_row(label: &str, value: &str) -> String {
    format!("  {:<28}{}", label, value)
}

fn availability_badge(lot: &ParkingLot) -> &'static str {
    if lot.is_available() {
        "Available for rent"
    } else {
        ""
    }
}

fn utilization_summary(lot: &ParkingLot) -> String {
    match (lot.avg_utilization, lot.underutilized_hours) {
        (Some(util), Some(hours)) => format!("{}% avg · {} quiet h/wk", util.round(), hours),
        (Some(util), None) => format!("{}% avg", util.round()),
        (None, Some(hours)) => format!("{} quiet h/wk", hours),
        (None, None) => "no utilization data".to_string(),
    }
}

/// The list panel: header, one row per visible lot, and the selected card.
pub fn render_discover(snapshot: &DiscoverSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Discover parking lots — {} ({} of {} shown, {} underutilized)",
        snapshot.filter.label(),
        snapshot.visible.len(),
        snapshot.total,
        snapshot.underutilized
    );

    if snapshot.visible.is_empty() {
        let _ = writeln!(out, "  No parking lots match this filter.");
        return out;
    }

    for lot in &snapshot.visible {
        let marker = if snapshot.is_selected(lot.id) { ">" } else { " " };
        let _ = writeln!(
            out,
            "{} [{:>4}] {:<32} {:<28} {}",
            marker,
            lot.id,
            lot.name,
            utilization_summary(lot),
            availability_badge(lot)
        );
    }

    if let Some(lot) = &snapshot.selected {
        let _ = writeln!(out);
        out.push_str(&render_selected_card(lot));
    }
    out
}

pub fn render_selected_card(lot: &ParkingLot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", lot.name);
    let _ = writeln!(out, "{}", stat_row("Address:", &lot.address));
    if let Some(capacity) = lot.estimated_capacity {
        let _ = writeln!(out, "{}", stat_row("Capacity:", &format!("{} spots", capacity)));
    }
    let _ = writeln!(out, "{}", stat_row("Utilization:", &utilization_summary(lot)));
    let _ = writeln!(out, "{}", stat_row("Details:", &lot_path(lot.id)));
    out
}

/// What the map widget receives: one marker per visible lot.
pub fn render_markers(snapshot: &DiscoverSnapshot) -> String {
    let mut out = String::new();
    for marker in snapshot.markers() {
        let _ = writeln!(
            out,
            "{} {:>4} {:<32} ({:.5}, {:.5})",
            if marker.selected { "*" } else { "-" },
            marker.id,
            marker.name,
            marker.lat,
            marker.lng
        );
    }
    out
}

pub fn render_detail(detail: &ParkingLotDetail, project: Option<&Project>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.name);
    if detail.is_available() {
        let _ = writeln!(out, "[Available for rent]");
    }
    let _ = writeln!(out, "{}", detail.address);

    let _ = writeln!(out, "\nOVERVIEW");
    let mut overview = Vec::new();
    if let Some(util) = detail.avg_utilization {
        overview.push(stat_row("Avg utilization", &format!("{}%", util.round())));
    }
    if let Some(hours) = detail.underutilized_hours {
        overview.push(stat_row("Underutilized hours/week", &hours.to_string()));
    }
    if let Some(capacity) = detail.estimated_capacity {
        overview.push(stat_row("Estimated capacity", &format!("{} spots", capacity)));
    }
    if let Some(rating) = detail.rating {
        let value = match detail.user_ratings_total {
            Some(total) => format!("{} ({} reviews)", rating, total),
            None => rating.to_string(),
        };
        overview.push(stat_row("Rating", &value));
    }
    if let Some(status) = detail.business_status.as_deref().filter(|s| !s.is_empty()) {
        overview.push(stat_row("Business status", status));
    }
    if overview.is_empty() {
        overview.push("  No utilization data yet.".to_string());
    }
    for row in overview {
        let _ = writeln!(out, "{}", row);
    }

    let phone = detail.phone_number.as_deref().filter(|s| !s.is_empty());
    let website = detail.website.as_deref().filter(|s| !s.is_empty());
    if phone.is_some() || website.is_some() {
        let _ = writeln!(out, "\nCONTACT");
        if let Some(phone) = phone {
            let _ = writeln!(out, "{}", stat_row("Phone", phone));
        }
        if let Some(website) = website {
            let _ = writeln!(out, "{}", stat_row("Website", website));
        }
    }

    if let Some(notes) = detail.contact_notes.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "\nNOTES\n  {}", notes);
    }

    if let Some(parcel) = &detail.parcel {
        let _ = writeln!(out, "\nPARCEL");
        let _ = writeln!(out, "{}", stat_row("APN", &parcel.apn));
        let _ = writeln!(out, "{}", stat_row("County", &parcel.county));
        let _ = writeln!(out, "{}", stat_row("State", &parcel.state));
        let _ = writeln!(out, "{}", stat_row("Owner", &parcel.owner_name));
        let _ = writeln!(out, "{}", stat_row("Owner type", &parcel.owner_type));
        if let Some(score) = parcel.rentability_score {
            let _ = writeln!(out, "{}", stat_row("Rentability score", &format!("{}/100", score)));
        }
    }

    let _ = writeln!(out, "\nPROJECT");
    match project {
        Some(project) => {
            let _ = writeln!(out, "{}", stat_row("Name", &project.name));
            let _ = writeln!(
                out,
                "{}",
                stat_row("Status", project.status.as_deref().unwrap_or("unknown"))
            );
            if let Some(goal) = project.investment_goal {
                let _ = writeln!(out, "{}", stat_row("Investment goal", &format!("${:.0}", goal)));
            }
        }
        None => {
            let _ = writeln!(out, "  No project yet. Request one to start crowdfunding this lot.");
        }
    }
    out
}

/// Error panel with a link back to the list.
pub fn render_error(message: &str) -> String {
    format!(
        "{}\n\n{}: {}\n",
        message,
        BACK_TO_DISCOVER,
        DiscoverRoute::default().path()
    )
}
