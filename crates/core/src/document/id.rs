/// Identifier and timestamp helpers.
///
/// Category ids come from the document store; variation ids are generated
/// client-side from the current time:
/// - Category: 32 hex chars (`uuid` v4, simple form)
/// - Variation: `variation_{unix millis}`
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

const VARIATION_PREFIX: &str = "variation_";

/// Fresh id for a new category document.
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Time-based variation id. Unique only within its parent category.
pub fn variation_id(now: DateTime<Utc>) -> String {
    format!("{VARIATION_PREFIX}{}", now.timestamp_millis())
}

/// Whether `id` has the `variation_<digits>` shape.
pub fn is_variation_id(id: &str) -> bool {
    id.strip_prefix(VARIATION_PREFIX)
        .is_some_and(|millis| !millis.is_empty() && millis.bytes().all(|b| b.is_ascii_digit()))
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
