//! Catalog seeding from YAML.
//!
//! ```yaml
//! categories:
//!   - title: Shirts
//!     items:
//!       - title: Linen Shirt
//!         price: "49.90"
//!         discount_price: "39.90"   # optional
//!         label: sale               # new | season | sale, default new
//!         slug: linen-shirt         # optional, derived from the title
//!         description: Breathable summer linen.
//!         quantity: 1
//!         image: https://cdn.example.com/linen-shirt.jpg
//! coupons:
//!   - code: SPRING10
//!     amount: "10.00"
//! ```
//!
//! Categories are matched by title, items by slug and coupons by code, so
//! running the same file twice updates rather than duplicates.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use wardrobe_core::slug::slugify;
use wardrobe_core::{CategoryId, ItemLabel};

use super::CommandError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid catalog file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A catalog file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub coupons: Vec<CouponSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub title: String,
    #[serde(default)]
    pub items: Vec<ItemSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemSeed {
    pub title: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub label: ItemLabel,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub image: String,
}

impl ItemSeed {
    /// The given slug, or one derived from the title.
    #[must_use]
    pub fn slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_owned(),
            _ => slugify(&self.title),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CouponSeed {
    pub code: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

const fn default_quantity() -> i32 {
    1
}

/// Totals written by a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub items: usize,
    pub coupons: usize,
}

impl CatalogFile {
    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for malformed YAML or unknown fields.
    pub fn from_yaml(content: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check everything the database would reject, before connecting.
    ///
    /// Returns one message per problem.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut slugs = std::collections::HashSet::new();

        for category in &self.categories {
            if category.title.trim().is_empty() {
                problems.push("a category has an empty title".to_owned());
            }
            for item in &category.items {
                let slug = item.slug();
                if slug.is_empty() {
                    problems.push(format!("item \"{}\" has no usable slug", item.title));
                } else if !slugs.insert(slug.clone()) {
                    problems.push(format!("slug \"{slug}\" is used more than once"));
                }
                if item.price.is_sign_negative()
                    || item.discount_price.is_some_and(|d| d.is_sign_negative())
                {
                    problems.push(format!("item \"{}\" has a negative price", item.title));
                }
                if item.quantity < 0 {
                    problems.push(format!("item \"{}\" has a negative quantity", item.title));
                }
            }
        }

        for coupon in &self.coupons {
            if coupon.code.trim().is_empty() || coupon.code.len() > 15 {
                problems.push(format!(
                    "coupon code \"{}\" must be 1 to 15 characters",
                    coupon.code
                ));
            }
            if coupon.amount.is_sign_negative() {
                problems.push(format!("coupon \"{}\" has a negative amount", coupon.code));
            }
        }

        problems
    }
}

/// Load a catalog file and upsert its contents in one transaction.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails
/// validation, or a database write fails.
pub async fn catalog(path: &Path) -> Result<(), SeedError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let catalog = CatalogFile::from_yaml(&content)?;
    let problems = catalog.problems();
    if !problems.is_empty() {
        for problem in &problems {
            tracing::error!("  - {problem}");
        }
        return Err(SeedError::Invalid(format!(
            "{} problem(s) found",
            problems.len()
        )));
    }

    tracing::info!(
        categories = catalog.categories.len(),
        coupons = catalog.coupons.len(),
        "Parsed catalog"
    );

    let pool = super::connect().await?;
    let summary = write_catalog(&pool, &catalog).await?;

    tracing::info!(
        categories = summary.categories,
        items = summary.items,
        coupons = summary.coupons,
        "Seeding complete!"
    );
    Ok(())
}

async fn write_catalog(pool: &PgPool, catalog: &CatalogFile) -> Result<SeedSummary, SeedError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for category in &catalog.categories {
        let category_id = upsert_category(&mut tx, category.title.trim()).await?;
        summary.categories += 1;

        for item in &category.items {
            upsert_item(&mut tx, category_id, item).await?;
            summary.items += 1;
        }
    }

    for coupon in &catalog.coupons {
        sqlx::query(
            r"
            INSERT INTO shop.coupon (code, amount)
            VALUES ($1, $2)
            ON CONFLICT (code) DO UPDATE SET amount = EXCLUDED.amount
            ",
        )
        .bind(coupon.code.trim())
        .bind(coupon.amount)
        .execute(&mut *tx)
        .await?;
        summary.coupons += 1;
    }

    tx.commit().await?;
    Ok(summary)
}

async fn upsert_category(conn: &mut PgConnection, title: &str) -> Result<CategoryId, SeedError> {
    let existing: Option<(CategoryId,)> =
        sqlx::query_as("SELECT id FROM shop.category WHERE title = $1 ORDER BY id LIMIT 1")
            .bind(title)
            .fetch_optional(&mut *conn)
            .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (CategoryId,) =
        sqlx::query_as("INSERT INTO shop.category (title) VALUES ($1) RETURNING id")
            .bind(title)
            .fetch_one(&mut *conn)
            .await?;
    Ok(id)
}

async fn upsert_item(
    conn: &mut PgConnection,
    category_id: CategoryId,
    item: &ItemSeed,
) -> Result<(), SeedError> {
    sqlx::query(
        r"
        INSERT INTO shop.item
            (title, price, discount_price, category_id, label, slug, description, quantity, image)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (slug) DO UPDATE SET
            title = EXCLUDED.title,
            price = EXCLUDED.price,
            discount_price = EXCLUDED.discount_price,
            category_id = EXCLUDED.category_id,
            label = EXCLUDED.label,
            description = EXCLUDED.description,
            quantity = EXCLUDED.quantity,
            image = EXCLUDED.image
        ",
    )
    .bind(item.title.trim())
    .bind(item.price)
    .bind(item.discount_price)
    .bind(category_id)
    .bind(item.label)
    .bind(item.slug())
    .bind(&item.description)
    .bind(item.quantity)
    .bind(&item.image)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    const CATALOG: &str = r#"
categories:
  - title: Shirts
    items:
      - title: Linen Shirt
        price: "49.90"
        discount_price: "39.90"
        label: sale
        image: https://cdn.example.com/linen.jpg
      - title: Oxford Shirt
        price: "59.00"
        slug: oxford
        quantity: 4
coupons:
  - code: SPRING10
    amount: "10.00"
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = CatalogFile::from_yaml(CATALOG).unwrap();
        assert_eq!(catalog.categories.len(), 1);
        assert_eq!(catalog.coupons.len(), 1);

        let items = &catalog.categories.first().unwrap().items;
        let linen = items.first().unwrap();
        assert_eq!(linen.slug(), "linen-shirt");
        assert_eq!(linen.label, ItemLabel::Sale);
        assert_eq!(linen.quantity, 1);
        assert_eq!(linen.discount_price, Some(Decimal::from_str("39.90").unwrap()));

        let oxford = items.last().unwrap();
        assert_eq!(oxford.slug(), "oxford");
        assert_eq!(oxford.label, ItemLabel::New);
        assert_eq!(oxford.discount_price, None);
        assert!(catalog.problems().is_empty());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = CatalogFile::from_yaml("categories:\n  - title: Shirts\n    colour: blue\n");
        assert!(matches!(result, Err(SeedError::Parse(_))));
    }

    #[test]
    fn test_problems_are_reported() {
        let catalog = CatalogFile::from_yaml(
            r#"
categories:
  - title: Hats
    items:
      - title: Cap
        price: "12.00"
      - title: "Cap!"
        price: "-1"
coupons:
  - code: THIS-CODE-IS-TOO-LONG
    amount: "5"
"#,
        )
        .unwrap();

        let problems = catalog.problems();
        // duplicate slug "cap", negative price, long coupon code
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().any(|p| p.contains("\"cap\" is used more than once")));
    }
}
