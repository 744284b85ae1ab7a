//! Catalog listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::CategoryId;
use wardrobe_core::models::Category;

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::page::PageContext;
use crate::state::AppState;
use crate::views::ItemView;

/// Catalog query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<u32>,
    pub category: Option<i32>,
}

/// Previous/next links of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pagination {
    /// Build pagination for `total` rows, or `None` if `page` is out of range.
    ///
    /// Page 1 always exists, even for an empty listing.
    #[must_use]
    pub fn new(page: u32, page_size: u32, total: i64, category: Option<CategoryId>) -> Option<Self> {
        let total = u64::try_from(total).unwrap_or(0);
        let total_pages = u32::try_from(total.div_ceil(u64::from(page_size.max(1))))
            .unwrap_or(u32::MAX)
            .max(1);

        if page == 0 || page > total_pages {
            return None;
        }

        let url = |p: u32| match category {
            Some(c) => format!("/?category={c}&page={p}"),
            None => format!("/?page={p}"),
        };

        Some(Self {
            current: page,
            total_pages,
            prev_url: (page > 1).then(|| url(page - 1)),
            next_url: (page < total_pages).then(|| url(page + 1)),
        })
    }

    /// SQL offset of the current page.
    #[must_use]
    pub fn offset(&self, page_size: u32) -> i64 {
        i64::from(self.current - 1) * i64::from(page_size)
    }
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub items: Vec<ItemView>,
    pub categories: Vec<Category>,
    pub active_category: Option<Category>,
    pub pagination: Pagination,
}

/// Display the catalog, newest items first.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<CatalogQuery>,
) -> Result<HomeTemplate> {
    let catalog = CatalogRepository::new(state.pool());
    let page_size = state.config().page_size;

    let active_category = match query.category {
        Some(id) => Some(
            catalog
                .category(CategoryId::new(id))
                .await?
                .ok_or_else(|| AppError::NotFound(format!("category {id}")))?,
        ),
        None => None,
    };
    let category_id = active_category.as_ref().map(|c| c.id);

    let total = catalog.count_items(category_id).await?;
    let pagination = Pagination::new(query.page.unwrap_or(1), page_size, total, category_id)
        .ok_or_else(|| AppError::NotFound("catalog page".to_owned()))?;

    let currency = state.stripe().currency();
    let items = catalog
        .items_page(category_id, i64::from(page_size), pagination.offset(page_size))
        .await?
        .iter()
        .map(|item| ItemView::new(item, currency))
        .collect();

    Ok(HomeTemplate {
        page,
        items,
        categories: catalog.categories().await?,
        active_category,
        pagination,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_links() {
        let p = Pagination::new(2, 10, 25, None).unwrap();
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.prev_url.as_deref(), Some("/?page=1"));
        assert_eq!(p.next_url.as_deref(), Some("/?page=3"));
        assert_eq!(p.offset(10), 10);
    }

    #[test]
    fn test_pagination_keeps_category() {
        let p = Pagination::new(1, 10, 11, Some(CategoryId::new(4))).unwrap();
        assert_eq!(p.prev_url, None);
        assert_eq!(p.next_url.as_deref(), Some("/?category=4&page=2"));
    }

    #[test]
    fn test_pagination_bounds() {
        assert!(Pagination::new(1, 10, 0, None).is_some());
        assert!(Pagination::new(0, 10, 5, None).is_none());
        assert!(Pagination::new(2, 10, 10, None).is_none());
    }
}
