//! Shared fixtures for client integration tests

#![allow(dead_code)]

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::MockServer;

use packtrace_client::config::{ApiConfig, Config, SessionConfig};
use shared::{Session, User, UserRole};

pub fn test_config(server: &MockServer) -> Config {
    Config {
        environment: "test".to_string(),
        api: ApiConfig {
            base_url: server.uri(),
            timeout_seconds: 5,
            basic_auth_username: None,
            basic_auth_password: None,
        },
        session: SessionConfig { storage_path: None },
    }
}

pub fn test_session(access_token: &str) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: format!("{}-refresh", access_token),
        expires_at: Utc::now() + Duration::hours(1),
        user: User {
            id: Uuid::new_v4(),
            username: "agent_one".to_string(),
            role: UserRole::FieldAgent,
        },
    }
}

/// Batch fixture with lifecycle timestamps consistent with `status`
pub fn batch_json(id: Uuid, status: &str, total_weight: &str, crates: Vec<Value>) -> Value {
    let order = ["open", "in_transit", "delivered", "reconciled", "closed"];
    let current = order.iter().position(|s| *s == status).unwrap();
    let ts = |target: &str, stamp: &str| -> Value {
        let target = order.iter().position(|s| *s == target).unwrap();
        if current >= target {
            json!(stamp)
        } else {
            Value::Null
        }
    };

    json!({
        "id": id,
        "batch_code": "PT-240815-DOI-0001",
        "status": status,
        "from_location": "Doi Farm",
        "to_location": "Chiang Mai Packhouse",
        "responsible_party": "agent_one",
        "total_crates": crates.len(),
        "total_weight_kg": total_weight,
        "crates": crates,
        "created_at": "2024-08-15T06:00:00Z",
        "departed_at": ts("in_transit", "2024-08-15T08:00:00Z"),
        "arrived_at": ts("delivered", "2024-08-15T11:00:00Z"),
        "reconciled_at": ts("reconciled", "2024-08-15T12:00:00Z"),
        "closed_at": ts("closed", "2024-08-15T12:30:00Z"),
    })
}

pub fn crate_json(qr_code: &str, weight: &str, reconciled_weight: Option<&str>) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "qr_code": qr_code,
        "variety_id": Uuid::new_v4(),
        "weight_kg": weight,
        "quality_grade": "a",
        "gps_location": null,
        "photo_url": null,
        "batch_id": null,
        "reconciled": reconciled_weight.is_some(),
        "reconciled_weight_kg": reconciled_weight,
        "reconciled_at": reconciled_weight.map(|_| "2024-08-15T11:30:00Z"),
        "created_at": "2024-08-15T05:00:00Z",
    })
}
