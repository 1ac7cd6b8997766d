use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted user name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// A listener, identified by name only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Trims a requested user name and checks its length
pub fn normalize_name(name: &str) -> Option<&str> {
    let name = name.trim();
    let len = name.chars().count();
    (1..=MAX_NAME_LEN).contains(&len).then_some(name)
}
