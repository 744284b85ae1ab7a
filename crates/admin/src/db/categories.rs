//! Category administration.

use sqlx::PgPool;

use wardrobe_core::CategoryId;
use wardrobe_core::models::Category;

use super::RepositoryError;

/// Repository for category CRUD.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, title FROM shop.category ORDER BY title, id")
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, title FROM shop.category WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, title: &str) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO shop.category (title) VALUES ($1) RETURNING id, title",
        )
        .bind(title)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn update(&self, id: CategoryId, title: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.category SET title = $2 WHERE id = $1")
            .bind(id)
            .bind(title)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a category and, through the foreign key, its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
