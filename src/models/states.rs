use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Class name used as the key prefix and `__class__` tag in storage.
pub const STATE_CLASS: &str = "State";

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct State {
    pub id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub name: String,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            name: name.into(),
        }
    }

    /// `State.<id>`, the key the storage engines index states under.
    pub fn storage_key(&self) -> String {
        format!("{}.{}", STATE_CLASS, self.id)
    }
}

/// Orders states ascending by name. The sort is stable, so states sharing a
/// name keep their incoming order.
pub fn sort_by_name(states: impl IntoIterator<Item = State>) -> Vec<State> {
    let mut states: Vec<State> = states.into_iter().collect();
    states.sort_by(|a, b| a.name.cmp(&b.name));
    states
}
