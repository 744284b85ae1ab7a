//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::DashboardRepository;
use crate::db::dashboard::DashboardCounts;
use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, RequireStaff};
use crate::page::PageContext;
use crate::state::AppState;

/// A dashboard tile linking to one of the panel's lists.
#[derive(Debug, Clone)]
pub struct DashboardLink {
    pub href: &'static str,
    pub label: &'static str,
    pub count: Option<i64>,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: PageContext,
    pub links: Vec<DashboardLink>,
}

fn dashboard_links(counts: &DashboardCounts) -> Vec<DashboardLink> {
    let link = |href, label, count| DashboardLink { href, label, count };
    vec![
        link("/orders?ordered=yes", "Orders", Some(counts.orders)),
        link("/orders?ordered=no", "Open carts", Some(counts.open_carts)),
        link("/refunds", "Pending refunds", Some(counts.pending_refunds)),
        link("/items", "Items", Some(counts.items)),
        link("/categories", "Categories", None),
        link("/coupons", "Coupons", None),
        link("/order-items", "Order items", None),
        link("/payments", "Payments", None),
        link("/addresses", "Addresses", None),
        link("/profiles", "User profiles", None),
    ]
}

/// Display the dashboard.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
) -> Result<DashboardTemplate> {
    let counts = DashboardRepository::new(state.pool()).counts().await?;

    Ok(DashboardTemplate {
        page: PageContext::new(staff, &flash, "dashboard").await,
        links: dashboard_links(&counts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_links_carry_counts() {
        let counts = DashboardCounts {
            items: 12,
            open_carts: 3,
            orders: 40,
            pending_refunds: 2,
        };
        let links = dashboard_links(&counts);

        let refunds = links.iter().find(|l| l.href == "/refunds");
        assert_eq!(refunds.and_then(|l| l.count), Some(2));
        let carts = links.iter().find(|l| l.label == "Open carts");
        assert_eq!(carts.and_then(|l| l.count), Some(3));
    }
}
