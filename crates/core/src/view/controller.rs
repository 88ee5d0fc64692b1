use std::collections::{HashMap, VecDeque};

use crate::document::validate::ValidationError;
use crate::document::{Category, ImageFile, ImageRef, Placement, TaxonomyKey, Variation};
use crate::error::{CatalogError, Result};
use crate::mutation::{CategoryService, CategoryUpdate, NewCategory, NewVariation, VariationUpdate};
use crate::store::{CategoryFilter, Subscription};
use crate::taxonomy::Taxonomy;

use super::notification::Notification;

/// Holds the operator's taxonomy selection and a cache of the categories
/// under each `(root, sub)` pair, kept current by a live subscription.
///
/// Snapshots replace the cached array wholesale. Variation-level mutations
/// patch the cache directly; category-level ones wait for the next snapshot.
pub struct CatalogController {
    service: CategoryService,
    selected_root: Option<String>,
    selected_sub: Option<String>,
    selected_type: Option<String>,
    selected_category: Option<String>,
    cache: HashMap<TaxonomyKey, Vec<Category>>,
    subscription: Option<Subscription>,
    loading: bool,
    notifications: VecDeque<Notification>,
}

impl CatalogController {
    pub fn new(service: CategoryService) -> Self {
        Self {
            service,
            selected_root: None,
            selected_sub: None,
            selected_type: None,
            selected_category: None,
            cache: HashMap::new(),
            subscription: None,
            loading: false,
            notifications: VecDeque::new(),
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        self.service.taxonomy()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    pub fn selected_root(&self) -> Option<&str> {
        self.selected_root.as_deref()
    }

    pub fn selected_sub(&self) -> Option<&str> {
        self.selected_sub.as_deref()
    }

    pub fn selected_type(&self) -> Option<&str> {
        self.selected_type.as_deref()
    }

    pub fn active_key(&self) -> Option<TaxonomyKey> {
        match (&self.selected_root, &self.selected_sub) {
            (Some(root), Some(sub)) => Some(TaxonomyKey::new(root, sub)),
            _ => None,
        }
    }

    pub fn cached(&self, key: &TaxonomyKey) -> Option<&[Category]> {
        self.cache.get(key).map(Vec::as_slice)
    }

    /// Categories for the active pair, narrowed by the selected type.
    pub fn current_categories(&self) -> Vec<&Category> {
        let Some(key) = self.active_key() else {
            return Vec::new();
        };
        self.cache
            .get(&key)
            .into_iter()
            .flatten()
            .filter(|c| {
                self.selected_type
                    .as_ref()
                    .map_or(true, |t| *t == c.category_type)
            })
            .collect()
    }

    pub fn selected_category(&self) -> Option<&Category> {
        let id = self.selected_category.as_deref()?;
        let key = self.active_key()?;
        self.cache.get(&key)?.iter().find(|c| c.id == id)
    }

    /// Number of cached categories for `sub` under the selected root.
    pub fn category_count(&self, sub: &str) -> usize {
        self.selected_root
            .as_ref()
            .and_then(|root| self.cache.get(&TaxonomyKey::new(root, sub)))
            .map_or(0, Vec::len)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    pub async fn select_root(&mut self, root: &str) -> Result<()> {
        if !self.taxonomy().has_root(root) {
            return Err(ValidationError::UnknownRoot(root.to_string()).into());
        }
        self.selected_root = Some(root.to_string());
        self.selected_type = None;
        self.selected_category = None;
        self.resubscribe().await
    }

    pub async fn select_sub(&mut self, sub: &str) -> Result<()> {
        if !self.taxonomy().has_sub(sub) {
            return Err(ValidationError::UnknownSub(sub.to_string()).into());
        }
        self.selected_sub = Some(sub.to_string());
        self.selected_type = None;
        self.selected_category = None;
        self.resubscribe().await
    }

    /// Narrow the current pair to one type. Client-side only; the
    /// subscription stays keyed on root and sub.
    pub fn select_type(&mut self, category_type: Option<&str>) -> Result<()> {
        let Some(category_type) = category_type else {
            self.selected_type = None;
            return Ok(());
        };
        let key = self
            .active_key()
            .ok_or(ValidationError::IncompleteSelection)?;
        let known = self
            .taxonomy()
            .types(&key.root_category, &key.sub_category)
            .iter()
            .any(|t| t == category_type);
        if !known {
            return Err(ValidationError::UnknownType {
                root: key.root_category,
                sub: key.sub_category,
                category_type: category_type.to_string(),
            }
            .into());
        }
        self.selected_type = Some(category_type.to_string());
        if self
            .selected_category()
            .is_some_and(|c| c.category_type != category_type)
        {
            self.selected_category = None;
        }
        Ok(())
    }

    pub fn select_category(&mut self, id: Option<&str>) -> Result<()> {
        match id {
            None => self.selected_category = None,
            Some(id) => {
                if !self.current_categories().iter().any(|c| c.id == id) {
                    return Err(CatalogError::NotFound(id.to_string()));
                }
                self.selected_category = Some(id.to_string());
            }
        }
        Ok(())
    }

    /// Tear down the subscription and forget the selection.
    pub fn clear_selection(&mut self) {
        self.close();
        self.selected_root = None;
        self.selected_sub = None;
        self.selected_type = None;
        self.selected_category = None;
    }

    /// Stop the live subscription. Cached data is kept.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.loading = false;
    }

    /// Wait for the next snapshot and apply it. Returns `false` when there is
    /// no open subscription.
    pub async fn next_snapshot(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        let key = subscription.filter().key();
        match subscription.next().await {
            Some(snapshot) => {
                self.apply_snapshot(key, snapshot);
                true
            }
            None => false,
        }
    }

    /// Apply every snapshot that has already arrived. Returns how many.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Some(subscription) = self.subscription.as_mut() {
            let key = subscription.filter().key();
            let Some(snapshot) = subscription.try_next() else {
                break;
            };
            self.apply_snapshot(key, snapshot);
            applied += 1;
        }
        applied
    }

    pub async fn add_category(&mut self, name: &str, image: Option<ImageFile>) -> Result<Category> {
        let placement = self.notify_on_err(self.selected_placement())?;
        self.loading = true;
        let result = self
            .service
            .add_category(NewCategory {
                placement,
                name: name.to_string(),
                image,
            })
            .await;
        self.finish(result, "Category added successfully", "Failed to add category")
    }

    pub async fn update_category(
        &mut self,
        id: &str,
        name: &str,
        image: ImageRef,
    ) -> Result<Category> {
        let placement = self.notify_on_err(self.placement_for(id))?;
        self.loading = true;
        let result = self
            .service
            .update_category(
                id,
                CategoryUpdate {
                    placement,
                    name: name.to_string(),
                    image,
                },
            )
            .await;
        self.finish(
            result,
            "Category updated successfully",
            "Failed to update category",
        )
    }

    pub async fn delete_category(&mut self, id: &str) -> Result<()> {
        self.loading = true;
        let result = self.service.delete_category(id).await;
        if result.is_ok() && self.selected_category.as_deref() == Some(id) {
            self.selected_category = None;
        }
        self.finish(
            result,
            "Category deleted successfully",
            "Failed to delete category",
        )
        .map(|_| ())
    }

    pub async fn add_variation(
        &mut self,
        name: &str,
        image: Option<ImageFile>,
    ) -> Result<Variation> {
        let (category_id, placement) = self.notify_on_err(self.selected_parent())?;
        self.loading = true;
        let result = self
            .service
            .add_variation(
                &category_id,
                NewVariation {
                    placement,
                    name: name.to_string(),
                    image,
                },
            )
            .await;
        if let Ok(variation) = &result {
            self.patch_variations(&category_id, |variations| {
                variations.push(variation.clone())
            });
        }
        self.finish(
            result,
            "Variation added successfully",
            "Failed to add variation",
        )
    }

    pub async fn update_variation(
        &mut self,
        variation_id: &str,
        name: &str,
        image: ImageRef,
    ) -> Result<Variation> {
        let (category_id, placement) = self.notify_on_err(self.selected_parent())?;
        self.loading = true;
        let result = self
            .service
            .update_variation(
                &category_id,
                variation_id,
                VariationUpdate {
                    placement,
                    name: name.to_string(),
                    image,
                },
            )
            .await;
        if let Ok(updated) = &result {
            self.patch_variations(&category_id, |variations| {
                if let Some(slot) = variations.iter_mut().find(|v| v.id == updated.id) {
                    *slot = updated.clone();
                }
            });
        }
        self.finish(
            result,
            "Variation updated successfully",
            "Failed to update variation",
        )
    }

    pub async fn delete_variation(&mut self, variation: &Variation) -> Result<()> {
        let (category_id, _) = self.notify_on_err(self.selected_parent())?;
        self.loading = true;
        let result = self.service.delete_variation(&category_id, variation).await;
        if result.is_ok() {
            self.patch_variations(&category_id, |variations| {
                variations.retain(|v| v.id != variation.id)
            });
        }
        self.finish(
            result,
            "Variation deleted successfully",
            "Failed to delete variation",
        )
    }

    async fn resubscribe(&mut self) -> Result<()> {
        self.close();
        let Some(key) = self.active_key() else {
            return Ok(());
        };
        self.loading = true;
        match self.service.subscribe(CategoryFilter::for_key(&key)).await {
            Ok(subscription) => {
                tracing::debug!(key = %key, "subscribed to categories");
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(err) => {
                self.loading = false;
                tracing::error!(error = %err, key = %key, "failed to subscribe to categories");
                self.notifications
                    .push_back(Notification::error(format!("Failed to load categories: {err}")));
                Err(err)
            }
        }
    }

    fn apply_snapshot(&mut self, key: TaxonomyKey, snapshot: Vec<Category>) {
        if self.active_key().as_ref() == Some(&key) {
            if let Some(id) = &self.selected_category {
                if !snapshot.iter().any(|c| &c.id == id) {
                    self.selected_category = None;
                }
            }
        }
        self.cache.insert(key, snapshot);
        self.loading = false;
    }

    fn patch_variations(&mut self, category_id: &str, patch: impl FnOnce(&mut Vec<Variation>)) {
        let Some(key) = self.active_key() else {
            return;
        };
        if let Some(category) = self
            .cache
            .get_mut(&key)
            .and_then(|categories| categories.iter_mut().find(|c| c.id == category_id))
        {
            patch(&mut category.variations);
        }
    }

    fn selected_placement(&self) -> Result<Placement> {
        match (&self.selected_root, &self.selected_sub, &self.selected_type) {
            (Some(root), Some(sub), Some(category_type)) => {
                Ok(Placement::new(root, sub, category_type))
            }
            _ => Err(ValidationError::IncompleteSelection.into()),
        }
    }

    /// Selected root and sub, with the selected type or else the cached
    /// category's own type.
    fn placement_for(&self, category_id: &str) -> Result<Placement> {
        let key = self
            .active_key()
            .ok_or(ValidationError::IncompleteSelection)?;
        let category_type = match &self.selected_type {
            Some(category_type) => category_type.clone(),
            None => self
                .cache
                .get(&key)
                .and_then(|categories| categories.iter().find(|c| c.id == category_id))
                .map(|c| c.category_type.clone())
                .ok_or(ValidationError::IncompleteSelection)?,
        };
        Ok(Placement::new(
            key.root_category,
            key.sub_category,
            category_type,
        ))
    }

    fn selected_parent(&self) -> Result<(String, Placement)> {
        let key = self
            .active_key()
            .ok_or(ValidationError::IncompleteSelection)?;
        let category = self
            .selected_category()
            .ok_or(ValidationError::NoCategorySelected)?;
        Ok((
            category.id.clone(),
            Placement::new(
                key.root_category,
                key.sub_category,
                category.category_type.clone(),
            ),
        ))
    }

    fn notify_on_err<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.notifications.push_back(Notification::error(err.to_string()));
        }
        result
    }

    fn finish<T>(&mut self, result: Result<T>, success: &str, failure: &str) -> Result<T> {
        self.loading = false;
        match &result {
            Ok(_) => self.notifications.push_back(Notification::success(success)),
            Err(err) => {
                tracing::error!(error = %err, "{failure}");
                self.notifications
                    .push_back(Notification::error(format!("{failure}: {err}")));
            }
        }
        result
    }
}
