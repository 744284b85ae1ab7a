//! Order list, detail and status changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use wardrobe_core::OrderId;

use crate::components::data_table::{
    TableRow, TableView, flag_cell, orders_table_config, parse_flag,
};
use crate::db::orders::{OrderDetail, OrderFilter, OrderRow};
use crate::db::{OrderRepository, Paging, search_pattern};
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{BulkOrdersForm, DeliveryStatusForm};
use crate::middleware::{Flash, RequireStaff};
use crate::page::PageContext;
use crate::routes::{ListTemplate, or_dash};
use crate::state::AppState;

/// Bulk action that grants the selected orders' refunds.
pub const GRANT_REFUND_ACTION: &str = "grant_refund";

const NOTHING_SELECTED: &str =
    "Items must be selected in order to perform actions on them. No items have been changed.";

/// Query parameters of the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub ordered: Option<String>,
    pub being_delivered: Option<String>,
    pub received: Option<String>,
    pub refund_requested: Option<String>,
    pub refund_granted: Option<String>,
}

impl OrdersQuery {
    fn filter(&self) -> OrderFilter {
        OrderFilter {
            ordered: parse_flag(self.ordered.as_deref()),
            being_delivered: parse_flag(self.being_delivered.as_deref()),
            received: parse_flag(self.received.as_deref()),
            refund_requested: parse_flag(self.refund_requested.as_deref()),
            refund_granted: parse_flag(self.refund_granted.as_deref()),
            search: search_pattern(self.q.as_deref()),
        }
    }

    fn selected(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("ordered", self.ordered.as_deref()),
            ("being_delivered", self.being_delivered.as_deref()),
            ("received", self.received.as_deref()),
            ("refund_requested", self.refund_requested.as_deref()),
            ("refund_granted", self.refund_granted.as_deref()),
        ]
    }
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "order_detail.html")]
pub struct OrderDetailTemplate {
    pub page: PageContext,
    pub detail: OrderDetail,
}

fn order_row(order: OrderRow) -> TableRow {
    let href = format!("/orders/{}", order.id);
    TableRow::new(
        order.id,
        vec![
            order.user_email.to_string(),
            or_dash(order.reference_code),
            flag_cell(order.ordered).to_owned(),
            flag_cell(order.being_delivered).to_owned(),
            flag_cell(order.received).to_owned(),
            flag_cell(order.refund_requested).to_owned(),
            flag_cell(order.refund_granted).to_owned(),
            or_dash(order.shipping_address),
            or_dash(order.billing_address),
            or_dash(order.stripe_charge_id),
            or_dash(order.coupon_code),
        ],
    )
    .link(href)
}

/// List orders and carts with status filters and search.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Query(query): Query<OrdersQuery>,
) -> Result<ListTemplate> {
    let paging = Paging::new(query.page);
    let filter = query.filter();
    let repo = OrderRepository::new(state.pool());

    let orders = repo.list(&filter, paging).await?;
    let total = repo.count(&filter).await?;

    let config = orders_table_config().with_selected(&query.selected());

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "orders").await,
        table: TableView::new(
            config,
            orders.into_iter().map(order_row).collect(),
            total,
            query.q.as_deref(),
            paging.page,
            paging.has_next(total),
        ),
    })
}

/// Apply a bulk action to the selected orders.
#[instrument(skip_all)]
pub async fn bulk(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    flash: Flash,
    Form(form): Form<BulkOrdersForm>,
) -> Result<Redirect> {
    let ids = form
        .ids()
        .map_err(|bad| AppError::BadRequest(format!("invalid order id: {bad}")))?;

    if ids.is_empty() {
        flash.warning(NOTHING_SELECTED).await;
        return Ok(Redirect::to("/orders"));
    }

    match form.action.as_str() {
        GRANT_REFUND_ACTION => {
            let updated = OrderRepository::new(state.pool()).grant_refunds(&ids).await?;
            let noun = if updated == 1 { "order was" } else { "orders were" };
            flash
                .success(format!("{updated} {noun} updated to refund granted."))
                .await;
        }
        _ => flash.warning("No action selected.").await,
    }

    Ok(Redirect::to("/orders"))
}

/// Display an order with its lines, addresses, payment and refunds.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Path(id): Path<OrderId>,
) -> Result<OrderDetailTemplate> {
    let detail = OrderRepository::new(state.pool())
        .detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderDetailTemplate {
        page: PageContext::new(staff, &flash, "orders").await,
        detail,
    })
}

/// Set the delivery flags of an order.
#[instrument(skip_all)]
pub async fn update_delivery(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    flash: Flash,
    Path(id): Path<OrderId>,
    Form(form): Form<DeliveryStatusForm>,
) -> Result<Redirect> {
    let (being_delivered, received) = form.flags();
    OrderRepository::new(state.pool())
        .set_delivery_status(id, being_delivered, received)
        .await?;

    flash.success("The order was changed successfully.").await;
    Ok(Redirect::to(&format!("/orders/{id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builds_filter() {
        let query = OrdersQuery {
            q: Some("ann".to_owned()),
            refund_requested: Some("yes".to_owned()),
            received: Some("no".to_owned()),
            ordered: Some(String::new()),
            ..OrdersQuery::default()
        };
        let filter = query.filter();

        assert_eq!(filter.refund_requested, Some(true));
        assert_eq!(filter.received, Some(false));
        assert_eq!(filter.ordered, None);
        assert_eq!(filter.being_delivered, None);
        assert_eq!(filter.search.as_deref(), Some("%ann%"));
    }
}
