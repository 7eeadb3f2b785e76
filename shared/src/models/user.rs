//! User and role models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account on the platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

/// Roles recognized by the tracking workflows
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    FieldAgent,
    PackhouseOperator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::FieldAgent => "field_agent",
            UserRole::PackhouseOperator => "packhouse_operator",
        }
    }
}
