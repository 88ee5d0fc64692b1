use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Category, Placement};
use crate::store::CategoryFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Emitted by a document store after every successful write, consumed by
/// live subscriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEvent {
    pub kind: ChangeKind,
    pub category_id: String,
    /// Placement before the write; `None` for creations.
    pub before: Option<Placement>,
    /// Placement after the write; `None` for deletions.
    pub after: Option<Placement>,
    pub timestamp: DateTime<Utc>,
}

impl CategoryEvent {
    pub fn created(category: &Category) -> Self {
        Self {
            kind: ChangeKind::Created,
            category_id: category.id.clone(),
            before: None,
            after: Some(category.placement()),
            timestamp: category.updated_at,
        }
    }

    pub fn updated(before: Placement, after: &Category) -> Self {
        Self {
            kind: ChangeKind::Updated,
            category_id: after.id.clone(),
            before: Some(before),
            after: Some(after.placement()),
            timestamp: after.updated_at,
        }
    }

    pub fn deleted(category_id: &str, before: Placement, at: DateTime<Utc>) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            category_id: category_id.to_string(),
            before: Some(before),
            after: None,
            timestamp: at,
        }
    }

    /// Whether the change can alter the result set of `filter`.
    pub fn touches(&self, filter: &CategoryFilter) -> bool {
        [&self.before, &self.after]
            .into_iter()
            .flatten()
            .any(|placement| filter.matches_placement(placement))
    }
}
