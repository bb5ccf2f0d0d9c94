// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora
//
// In-process stand-in for the Agora REST backend.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

pub struct Request {
    pub method: String,
    pub path: String,
    pub body: String,
    pub authorization: Option<String>,
}

pub struct MockBackend {
    pub base: String,
    log: Arc<Mutex<Vec<String>>>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockBackend {
    /// `handler` sees paths relative to `/api` and returns (status, body).
    pub fn start<H>(handler: H) -> Self
    where
        H: Fn(&Request) -> (u16, String) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let base = format!("http://{}/api", server.server_addr());
        let log = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let log_clone = Arc::clone(&log);
        let stop_clone = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !stop_clone.load(Ordering::Relaxed) {
                let mut req = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };
                let mut body = String::new();
                let _ = req.as_reader().read_to_string(&mut body);
                let authorization = req
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());
                let request = Request {
                    method: req.method().to_string().to_uppercase(),
                    path: req
                        .url()
                        .strip_prefix("/api")
                        .unwrap_or(req.url())
                        .to_string(),
                    body,
                    authorization,
                };
                log_clone
                    .lock()
                    .unwrap()
                    .push(format!("{} {}", request.method, request.path));

                let (status, body) = handler(&request);
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json")
                            .expect("content-type header"),
                    );
                let _ = req.respond(response);
            }
        });

        Self {
            base,
            log,
            stop,
            handle: Some(handle),
        }
    }

    /// Number of requests received as "METHOD /path".
    pub fn hits(&self, request_line: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.as_str() == request_line)
            .count()
    }

    pub fn total_hits(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn lot_json(id: i64, available: Option<bool>, util: Option<f64>, hours: Option<u32>) -> Value {
    json!({
        "id": id,
        "place_id": format!("place-{}", id),
        "name": format!("Lot {}", id),
        "address": format!("{} Congress Ave, Austin, TX", id),
        "latitude": 30.26 + id as f64 / 1000.0,
        "longitude": -97.74,
        "phone_number": null,
        "website": null,
        "popular_times": null,
        "avg_utilization": util,
        "underutilized_hours": hours,
        "rating": 4.1,
        "user_ratings_total": 20,
        "business_status": "OPERATIONAL",
        "last_synced_at": null,
        "is_available_for_rent": available,
        "contact_notes": null,
        "estimated_capacity": 80,
        "created_at": "2025-02-01T10:00:00",
        "updated_at": "2025-02-01T10:00:00"
    })
}

pub fn project_json(id: i64, lot_id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Lot {}", lot_id),
        "required_fund": null,
        "project_type": null,
        "project_description": null,
        "status": "pending",
        "investment_goal": null,
        "created_at": "2025-02-03T09:00:00Z",
        "updated_at": "2025-02-03T09:00:00Z"
    })
}

pub fn not_found(detail: &str) -> (u16, String) {
    (404, json!({ "detail": detail }).to_string())
}

pub fn config_for(backend: &MockBackend) -> agora_core::Config {
    agora_core::Config {
        api_url: backend.base.clone(),
        request_timeout_secs: 5,
        query: agora_core::query::QueryOptions {
            stale_time: Duration::from_secs(60),
            retries: 0,
            retry_delay: Duration::ZERO,
            capacity: 32,
        },
        ..Default::default()
    }
}
