mod common;

use std::time::Duration;

use catalog_core::document::validate::ValidationError;
use catalog_core::document::{ImageRef, TaxonomyKey};
use catalog_core::view::{CatalogController, NotificationLevel};
use catalog_core::CatalogError;
use tokio::time::timeout;

use common::{jpeg, png, Call, Harness, MB};

async fn settle(controller: &mut CatalogController) {
    assert!(
        timeout(Duration::from_secs(2), controller.next_snapshot())
            .await
            .expect("snapshot in time"),
        "subscription closed"
    );
}

/// Controller with Modern / Kitchen / Small Appliances selected and the
/// initial snapshot applied.
async fn kitchen_controller(harness: &Harness) -> CatalogController {
    let mut controller = CatalogController::new(harness.service.clone());
    controller.select_root("Modern").await.unwrap();
    controller.select_sub("Kitchen").await.unwrap();
    assert!(controller.is_loading());
    settle(&mut controller).await;
    controller.select_type(Some("Small Appliances")).unwrap();
    controller
}

#[tokio::test]
async fn selecting_a_pair_subscribes_and_loads() {
    let harness = Harness::new();
    let mut controller = CatalogController::new(harness.service.clone());

    controller.select_root("Modern").await.unwrap();
    assert!(!controller.is_subscribed());
    assert!(!controller.is_loading());

    controller.select_sub("Kitchen").await.unwrap();
    assert!(controller.is_subscribed());
    assert!(controller.is_loading());

    settle(&mut controller).await;
    assert!(!controller.is_loading());
    assert_eq!(
        controller.cached(&TaxonomyKey::new("Modern", "Kitchen")),
        Some(&[][..])
    );
}

#[tokio::test]
async fn unknown_nodes_are_rejected() {
    let harness = Harness::new();
    let mut controller = CatalogController::new(harness.service.clone());
    assert!(matches!(
        controller.select_root("Gothic").await,
        Err(CatalogError::Validation(ValidationError::UnknownRoot(_)))
    ));
    assert!(matches!(
        controller.select_type(Some("Lighting")),
        Err(CatalogError::Validation(ValidationError::IncompleteSelection))
    ));
}

#[tokio::test]
async fn changing_selection_replaces_the_subscription() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;
    controller.add_category("Toaster Sets", Some(jpeg("t.jpg", MB))).await.unwrap();
    settle(&mut controller).await;
    assert_eq!(controller.category_count("Kitchen"), 1);

    harness.clear_calls();
    controller.select_sub("Bedroom").await.unwrap();
    settle(&mut controller).await;

    assert_eq!(
        harness
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Subscribe))
            .count(),
        1
    );
    assert!(controller.current_categories().is_empty());
    // Counts stay available per sub for the selected root.
    assert_eq!(controller.category_count("Kitchen"), 1);
    assert_eq!(controller.category_count("Bedroom"), 0);
}

#[tokio::test]
async fn added_category_arrives_through_the_subscription() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;

    let created = controller
        .add_category("Toaster Sets", Some(jpeg("toaster.jpg", 2 * MB)))
        .await
        .unwrap();
    assert!(!controller.is_loading());
    let notes = controller.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Success);

    settle(&mut controller).await;
    let current = controller.current_categories();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, created.id);
}

#[tokio::test]
async fn add_category_requires_full_selection() {
    let harness = Harness::new();
    let mut controller = CatalogController::new(harness.service.clone());
    controller.select_root("Modern").await.unwrap();

    let err = controller
        .add_category("Toaster Sets", Some(jpeg("t.jpg", 10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::IncompleteSelection)
    ));
    assert!(controller.take_notifications()[0].is_error());
    assert!(harness.calls().is_empty());
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;
    let created = controller
        .add_category("Toaster Sets", Some(jpeg("t.jpg", 10)))
        .await
        .unwrap();
    settle(&mut controller).await;
    controller.select_category(Some(&created.id)).unwrap();
    let before = controller.current_categories()[0].clone();

    harness.blobs.deny_uploads();
    controller.take_notifications();
    let result = controller.add_variation("Red", Some(png("r.png", 10))).await;

    assert!(matches!(result, Err(CatalogError::Blob(_))));
    assert!(!controller.is_loading());
    assert_eq!(controller.current_categories()[0], &before);
    let notes = controller.take_notifications();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].message.starts_with("Failed to add variation"));
}

#[tokio::test]
async fn variation_changes_patch_the_cache_directly() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;
    let created = controller
        .add_category("Toaster Sets", Some(jpeg("t.jpg", 10)))
        .await
        .unwrap();
    settle(&mut controller).await;
    controller.select_category(Some(&created.id)).unwrap();

    let red = controller
        .add_variation("Red Toaster", Some(png("red.png", MB)))
        .await
        .unwrap();
    // No snapshot applied yet: the cache was patched in place.
    let selected = controller.selected_category().unwrap();
    assert_eq!(selected.variations, [red.clone()]);

    let renamed = controller
        .update_variation(
            &red.id,
            "Crimson Toaster",
            ImageRef::persisted(&red.image, &red.image_path),
        )
        .await
        .unwrap();
    let selected = controller.selected_category().unwrap();
    assert_eq!(selected.variations[0].name, "Crimson Toaster");
    assert_eq!(selected.variations[0].created_at, red.created_at);

    controller.delete_variation(&renamed).await.unwrap();
    assert!(controller.selected_category().unwrap().variations.is_empty());

    // One snapshot per write; the last one agrees with the patched cache.
    for _ in 0..3 {
        settle(&mut controller).await;
    }
    assert!(controller.selected_category().unwrap().variations.is_empty());
    assert_eq!(controller.apply_pending(), 0);
}

#[tokio::test]
async fn variation_mutations_need_a_selected_category() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;
    let err = controller
        .add_variation("Red", Some(png("r.png", 10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::NoCategorySelected)
    ));
}

#[tokio::test]
async fn deleting_the_selected_category_clears_selection() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;
    let created = controller
        .add_category("Toaster Sets", Some(jpeg("t.jpg", 10)))
        .await
        .unwrap();
    settle(&mut controller).await;
    controller.select_category(Some(&created.id)).unwrap();

    controller.delete_category(&created.id).await.unwrap();
    assert!(controller.selected_category().is_none());

    settle(&mut controller).await;
    assert!(controller.current_categories().is_empty());
}

#[tokio::test]
async fn update_category_uses_cached_type_without_type_selection() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;
    let created = controller
        .add_category("Toaster Sets", Some(jpeg("t.jpg", 10)))
        .await
        .unwrap();
    settle(&mut controller).await;
    controller.select_type(None).unwrap();

    let updated = controller
        .update_category(
            &created.id,
            "Toasters",
            ImageRef::persisted(&created.featured_image, &created.image_path),
        )
        .await
        .unwrap();
    assert_eq!(updated.category_type, "Small Appliances");

    settle(&mut controller).await;
    assert_eq!(controller.current_categories()[0].name, "Toasters");
}

#[tokio::test]
async fn type_selection_narrows_client_side() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;
    controller
        .add_category("Toaster Sets", Some(jpeg("t.jpg", 10)))
        .await
        .unwrap();
    settle(&mut controller).await;

    controller.select_type(Some("Lighting")).unwrap();
    controller
        .add_category("Pendants", Some(jpeg("p.jpg", 10)))
        .await
        .unwrap();
    settle(&mut controller).await;

    assert_eq!(controller.current_categories().len(), 1);
    assert_eq!(controller.current_categories()[0].name, "Pendants");
    controller.select_type(None).unwrap();
    assert_eq!(controller.current_categories().len(), 2);
    assert_eq!(controller.category_count("Kitchen"), 2);
}

#[tokio::test]
async fn close_stops_updates() {
    let harness = Harness::new();
    let mut controller = kitchen_controller(&harness).await;
    controller.close();
    assert!(!controller.is_subscribed());
    assert!(!controller.next_snapshot().await);

    controller.clear_selection();
    assert!(controller.active_key().is_none());
    assert!(controller.current_categories().is_empty());
}
