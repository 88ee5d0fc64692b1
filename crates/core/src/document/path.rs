//! Object storage path convention.
//!
//! The path is derived once, at upload time, and then stored alongside the
//! URL. Deletes always use the stored path, never a recomputed one.

use chrono::{DateTime, Utc};

use super::model::Placement;

const ROOT: &str = "categories";

/// `categories/{root}/{sub}/{type}/{name}/{millis}_{file}`
pub fn category_image_path(
    placement: &Placement,
    name: &str,
    now: DateTime<Utc>,
    file_name: &str,
) -> String {
    format!(
        "{ROOT}/{}/{}/{}/{name}/{}",
        placement.root_category,
        placement.sub_category,
        placement.category_type,
        stamped_file_name(now, file_name)
    )
}

/// `categories/{root}/{sub}/{type}/{categoryId}/variations/{name}/{millis}_{file}`
pub fn variation_image_path(
    placement: &Placement,
    category_id: &str,
    name: &str,
    now: DateTime<Utc>,
    file_name: &str,
) -> String {
    format!(
        "{ROOT}/{}/{}/{}/{category_id}/variations/{name}/{}",
        placement.root_category,
        placement.sub_category,
        placement.category_type,
        stamped_file_name(now, file_name)
    )
}

fn stamped_file_name(now: DateTime<Utc>, file_name: &str) -> String {
    format!("{}_{file_name}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn placement() -> Placement {
        Placement::new("Modern", "Kitchen", "Small Appliances")
    }

    #[test]
    fn category_path_layout() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(
            category_image_path(&placement(), "Toaster Sets", now, "toaster.jpg"),
            "categories/Modern/Kitchen/Small Appliances/Toaster Sets/1700000000000_toaster.jpg"
        );
    }

    #[test]
    fn variation_path_layout() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();
        assert_eq!(
            variation_image_path(&placement(), "cat42", "Red Toaster", now, "red.png"),
            "categories/Modern/Kitchen/Small Appliances/cat42/variations/Red Toaster/1700000000500_red.png"
        );
    }
}
