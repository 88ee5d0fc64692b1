//! Operator-side view state: taxonomy selection plus a live-synchronised
//! cache of the categories under it.

pub mod controller;
pub mod notification;

pub use controller::CatalogController;
pub use notification::{Notification, NotificationLevel};
