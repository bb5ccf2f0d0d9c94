// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora
//
// Status-code contracts of the fetch layer against an in-process backend.

mod support;

use agora_core::{ApiClient, ApiError};
use serde_json::json;
use std::time::Duration;
use support::{lot_json, not_found, project_json, MockBackend};

fn client(backend: &MockBackend) -> ApiClient {
    ApiClient::new(&backend.base, Duration::from_secs(5)).unwrap()
}

#[test]
fn test_list_parking_lots_decodes_records() {
    let backend = MockBackend::start(|req| match req.path.as_str() {
        "/parking-lots/" => (
            200,
            json!([lot_json(1, Some(true), Some(80.0), None), lot_json(2, None, Some(10.0), Some(30))])
                .to_string(),
        ),
        _ => not_found("Not Found"),
    });

    let lots = client(&backend).list_parking_lots().unwrap();
    assert_eq!(lots.len(), 2);
    assert_eq!(lots[0].name, "Lot 1");
    assert!(lots[0].is_available());
    assert_eq!(lots[1].underutilized_hours, Some(30));
    assert_eq!(backend.hits("GET /parking-lots/"), 1);
}

#[test]
fn test_list_parking_lots_non_2xx_is_http_error() {
    let backend = MockBackend::start(|_| (500, json!({"detail": "database offline"}).to_string()));

    match client(&backend).list_parking_lots() {
        Err(ApiError::Http { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[test]
fn test_get_parking_lot_missing_is_not_found() {
    let backend = MockBackend::start(|_| not_found("Parking lot not found"));

    let err = client(&backend).get_parking_lot(999).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Parking lot not found.");
    assert_eq!(backend.hits("GET /parking-lots/999"), 1);
}

#[test]
fn test_get_parking_lot_other_failure_is_http_error() {
    let backend = MockBackend::start(|_| (403, String::new()));

    let err = client(&backend).get_parking_lot(3).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 403, .. }));
}

#[test]
fn test_get_parking_lot_with_parcel() {
    let backend = MockBackend::start(|req| {
        if req.path == "/parking-lots/4" {
            let mut lot = lot_json(4, Some(true), Some(25.0), Some(60));
            lot["parcel"] = json!({
                "id": 11, "parking_lot_id": 4, "apn": "123-456", "address": "4 Congress Ave",
                "county": "Travis", "state": "TX", "owner_name": "Congress Partners LLC",
                "owner_type": "llc", "is_likely_commercial": true, "geometry": null,
                "rentability_score": 81, "rentability_notes": ["Commercial owner"]
            });
            (200, lot.to_string())
        } else {
            not_found("Not Found")
        }
    });

    let detail = client(&backend).get_parking_lot(4).unwrap();
    assert_eq!(detail.id, 4);
    let parcel = detail.parcel.as_ref().unwrap();
    assert_eq!(parcel.apn, "123-456");
    assert_eq!(parcel.rentability_notes.as_deref(), Some(&["Commercial owner".to_string()][..]));
}

#[test]
fn test_project_lookup_404_means_no_project() {
    let backend = MockBackend::start(|req| match req.path.as_str() {
        "/projects/by-parking-lot/5" => not_found("No project for this parking lot"),
        "/projects/by-parking-lot/6" => (200, project_json(1, 6).to_string()),
        _ => (500, String::new()),
    });
    let api = client(&backend);

    assert_eq!(api.get_project_for_parking_lot(5).unwrap(), None);
    let project = api.get_project_for_parking_lot(6).unwrap().unwrap();
    assert_eq!(project.status.as_deref(), Some("pending"));
    assert!(api.get_project_for_parking_lot(7).is_err());
}

#[test]
fn test_request_project_posts_lot_id() {
    let backend = MockBackend::start(|req| {
        if req.method == "POST" && req.path == "/projects/request" {
            let body: serde_json::Value = serde_json::from_str(&req.body).unwrap();
            let lot_id = body["parking_lot_id"].as_i64().unwrap();
            (201, project_json(9, lot_id).to_string())
        } else {
            (405, String::new())
        }
    });

    let project = client(&backend).request_project(5).unwrap();
    assert_eq!(project.id, 9);
    assert_eq!(project.name, "Lot 5");
    assert_eq!(backend.hits("POST /projects/request"), 1);
}

#[test]
fn test_request_project_carries_server_message() {
    let backend = MockBackend::start(|_| {
        (
            400,
            json!({"detail": "A project already exists for this parking lot"}).to_string(),
        )
    });

    let err = client(&backend).request_project(5).unwrap_err();
    match &err {
        ApiError::Http { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "A project already exists for this parking lot");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
    assert_eq!(err.user_message(), "A project already exists for this parking lot");
}

#[test]
fn test_malformed_json_is_decode_error() {
    let backend = MockBackend::start(|_| (200, "{\"id\": ".to_string()));

    let err = client(&backend).list_parking_lots().unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
    assert!(!err.is_retryable());
}

#[test]
fn test_unreachable_backend_is_transport_error() {
    let api = ApiClient::new("http://127.0.0.1:9/api", Duration::from_millis(500)).unwrap();
    let err = api.list_parking_lots().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(err.is_retryable());
}

#[test]
fn test_sync_user_sends_bearer_token() {
    let backend = MockBackend::start(|req| {
        if req.path == "/users/me" && req.authorization.as_deref() == Some("Bearer wallet-token") {
            (200, json!({"id": 1}).to_string())
        } else {
            (401, json!({"detail": "Not authenticated"}).to_string())
        }
    });
    let api = client(&backend);

    api.sync_user("wallet-token").unwrap();
    let err = api.sync_user("other").unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }));
}
