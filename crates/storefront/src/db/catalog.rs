//! Catalog repository: categories and items.

use sqlx::PgPool;

use wardrobe_core::CategoryId;
use wardrobe_core::models::{Category, Item};

use super::RepositoryError;

const ITEM_COLUMNS: &str = "id, title, price, discount_price, category_id, label, slug, description, quantity, image";

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, title FROM shop.category ORDER BY title, id")
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// One page of items, newest first, optionally limited to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_page(
        &self,
        category: Option<CategoryId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Item>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {ITEM_COLUMNS}
            FROM shop.item
            WHERE ($1::int IS NULL OR category_id = $1)
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "
        );
        let items = sqlx::query_as::<_, Item>(&sql)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;
        Ok(items)
    }

    /// Number of items, optionally limited to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_items(&self, category: Option<CategoryId>) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shop.item WHERE ($1::int IS NULL OR category_id = $1)",
        )
        .bind(category)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Look up an item by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_by_slug(&self, slug: &str) -> Result<Option<Item>, RepositoryError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM shop.item WHERE slug = $1");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(item)
    }

    /// Look up a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, title FROM shop.category WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(category)
    }
}
