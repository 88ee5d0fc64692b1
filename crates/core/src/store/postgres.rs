use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::document::id::new_document_id;
use crate::document::{Category, CategoryDraft, CategoryPatch, Placement, Variation};
use crate::events::{CategoryEvent, EventBus};

use super::document::{CategoryFilter, DocumentStore, StoreError};
use super::subscription::Subscription;

const COLUMNS: &str = "id, name, root_category, sub_category, category_type, \
                       featured_image, image_path, variations, created_at, updated_at";

/// `COLUMNS` qualified by the `c` alias used in updates.
const RETURNING_COLUMNS: &str = "c.id, c.name, c.root_category, c.sub_category, \
                                 c.category_type, c.featured_image, c.image_path, \
                                 c.variations, c.created_at, c.updated_at";

/// Database row representation of a category.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    root_category: String,
    sub_category: String,
    category_type: String,
    featured_image: String,
    image_path: String,
    variations: Json<Vec<Variation>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row returned by an update, with the placement it had before.
#[derive(Debug, sqlx::FromRow)]
struct UpdatedRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    previous_root: String,
    previous_sub: String,
    previous_type: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DeletedRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    deleted_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            root_category: row.root_category,
            sub_category: row.sub_category,
            category_type: row.category_type,
            featured_image: row.featured_image,
            image_path: row.image_path,
            variations: row.variations.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `categories` table in PostgreSQL. Timestamps come from the database clock.
///
/// Change notifications go through the in-process [`EventBus`], so live
/// subscriptions only see writes made through this process.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    bus: EventBus,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool, bus: EventBus) -> Self {
        Self { pool, bus }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, draft: CategoryDraft) -> Result<Category, StoreError> {
        let row: CategoryRow = sqlx::query_as(&format!(
            "INSERT INTO categories (id, name, root_category, sub_category, category_type, \
             featured_image, image_path, variations) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}"
        ))
        .bind(new_document_id())
        .bind(&draft.name)
        .bind(&draft.placement.root_category)
        .bind(&draft.placement.sub_category)
        .bind(&draft.placement.category_type)
        .bind(&draft.featured_image)
        .bind(&draft.image_path)
        .bind(Json(&draft.variations))
        .fetch_one(&self.pool)
        .await?;

        let category = Category::from(row);
        self.bus.publish(CategoryEvent::created(&category));
        Ok(category)
    }

    async fn get(&self, id: &str) -> Result<Option<Category>, StoreError> {
        let row: Option<CategoryRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM categories WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Category::from))
    }

    /// Single statement: only the fields present in `patch` are written, so
    /// concurrent patches touching different fields both survive. The old
    /// placement comes from the locked pre-image, not a separate read.
    async fn update(&self, id: &str, patch: CategoryPatch) -> Result<Category, StoreError> {
        let (root_category, sub_category, category_type) = match patch.placement {
            Some(placement) => (
                Some(placement.root_category),
                Some(placement.sub_category),
                Some(placement.category_type),
            ),
            None => (None, None, None),
        };

        let row: Option<UpdatedRow> = sqlx::query_as(&format!(
            "WITH previous AS ( \
                 SELECT id, root_category, sub_category, category_type \
                 FROM categories WHERE id = $1 FOR UPDATE \
             ) \
             UPDATE categories c SET \
                 name = COALESCE($2, c.name), \
                 root_category = COALESCE($3, c.root_category), \
                 sub_category = COALESCE($4, c.sub_category), \
                 category_type = COALESCE($5, c.category_type), \
                 featured_image = COALESCE($6, c.featured_image), \
                 image_path = COALESCE($7, c.image_path), \
                 variations = COALESCE($8, c.variations), \
                 updated_at = now() \
             FROM previous p WHERE c.id = p.id \
             RETURNING {RETURNING_COLUMNS}, \
                 p.root_category AS previous_root, \
                 p.sub_category AS previous_sub, \
                 p.category_type AS previous_type"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(root_category)
        .bind(sub_category)
        .bind(category_type)
        .bind(patch.featured_image)
        .bind(patch.image_path)
        .bind(patch.variations.map(Json))
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let before = Placement::new(row.previous_root, row.previous_sub, row.previous_type);
        let updated = Category::from(row.category);
        self.bus.publish(CategoryEvent::updated(before, &updated));
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let row: Option<DeletedRow> = sqlx::query_as(&format!(
            "DELETE FROM categories WHERE id = $1 RETURNING {COLUMNS}, now() AS deleted_at"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = Category::from(row.category);
        self.bus.publish(CategoryEvent::deleted(
            id,
            removed.placement(),
            row.deleted_at,
        ));
        Ok(())
    }

    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>, StoreError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM categories \
             WHERE root_category = $1 AND sub_category = $2 \
             AND ($3::text IS NULL OR category_type = $3) \
             ORDER BY created_at, id"
        ))
        .bind(&filter.root_category)
        .bind(&filter.sub_category)
        .bind(filter.category_type.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Category>, StoreError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM categories ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn subscribe(&self, filter: CategoryFilter) -> Result<Subscription, StoreError> {
        let events = self.bus.subscribe();
        Ok(Subscription::spawn(Arc::new(self.clone()), events, filter))
    }
}
