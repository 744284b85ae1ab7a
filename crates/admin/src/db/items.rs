//! Item administration.

use rust_decimal::Decimal;
use sqlx::PgPool;

use wardrobe_core::models::Item;
use wardrobe_core::{CategoryId, ItemId, ItemLabel};

use super::{Paging, RepositoryError};

/// Validated item fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInput {
    pub title: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub category_id: CategoryId,
    pub label: ItemLabel,
    pub slug: String,
    pub description: String,
    pub quantity: i32,
    pub image: String,
}

/// An item row in the admin list.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    pub id: ItemId,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub label: ItemLabel,
    pub quantity: i32,
    pub category_title: String,
}

/// Repository for item CRUD.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Items whose title matches `pattern` (an `ILIKE` pattern), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        pattern: Option<&str>,
        paging: Paging,
    ) -> Result<Vec<ItemRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT i.id, i.title, i.slug, i.price, i.discount_price, i.label, i.quantity,
                   c.title AS category_title
            FROM shop.item i
            JOIN shop.category c ON c.id = i.category_id
            WHERE $1::text IS NULL OR i.title ILIKE $1
            ORDER BY i.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(pattern)
        .bind(paging.per_page)
        .bind(paging.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Count items whose title matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, pattern: Option<&str>) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shop.item WHERE $1::text IS NULL OR title ILIKE $1",
        )
        .bind(pattern)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let item = sqlx::query_as::<_, Item>(
            r"
            SELECT id, title, price, discount_price, category_id, label, slug,
                   description, quantity, image
            FROM shop.item
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(item)
    }

    /// Create an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &ItemInput) -> Result<ItemId, RepositoryError> {
        let (id,): (ItemId,) = sqlx::query_as(
            r"
            INSERT INTO shop.item
                (title, price, discount_price, category_id, label, slug, description, quantity, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(&input.title)
        .bind(input.price)
        .bind(input.discount_price)
        .bind(input.category_id)
        .bind(input.label)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(&input.image)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        tracing::info!(item_id = %id, slug = %input.slug, "Item created");
        Ok(id)
    }

    /// Replace an item's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist and
    /// `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(&self, id: ItemId, input: &ItemInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.item
            SET title = $2, price = $3, discount_price = $4, category_id = $5, label = $6,
                slug = $7, description = $8, quantity = $9, image = $10
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.title)
        .bind(input.price)
        .bind(input.discount_price)
        .bind(input.category_id)
        .bind(input.label)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.quantity)
        .bind(&input.image)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn delete(&self, id: ItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.item WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(item_id = %id, "Item deleted");
        Ok(())
    }
}
