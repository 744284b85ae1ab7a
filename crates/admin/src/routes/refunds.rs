//! Refund requests.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use tracing::instrument;

use wardrobe_core::RefundId;

use crate::components::data_table::{TableRow, TableView, flag_cell, refunds_table_config};
use crate::db::refunds::RefundRow;
use crate::db::{Paging, RefundRepository};
use crate::error::Result;
use crate::middleware::{Flash, RequireStaff};
use crate::page::PageContext;
use crate::routes::{ListQuery, ListTemplate};
use crate::state::AppState;

fn refund_row(refund: RefundRow) -> TableRow {
    let order = refund
        .reference_code
        .unwrap_or_else(|| format!("#{}", refund.order_id));
    TableRow::new(
        refund.id,
        vec![
            order,
            refund.email.to_string(),
            refund.reason,
            flag_cell(refund.accepted).to_owned(),
        ],
    )
    .link(format!("/orders/{}", refund.order_id))
}

/// List refund requests, pending first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> Result<ListTemplate> {
    let paging = Paging::new(query.page);
    let repo = RefundRepository::new(state.pool());

    let refunds = repo.list(paging).await?;
    let total = repo.count().await?;

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "refunds").await,
        table: TableView::new(
            refunds_table_config(),
            refunds.into_iter().map(refund_row).collect(),
            total,
            None,
            paging.page,
            paging.has_next(total),
        ),
    })
}

/// Accept a refund request and return to its order.
#[instrument(skip_all)]
pub async fn accept(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    flash: Flash,
    Path(id): Path<RefundId>,
) -> Result<Redirect> {
    let order_id = RefundRepository::new(state.pool()).accept(id).await?;
    flash.success("The refund request was accepted.").await;
    Ok(Redirect::to(&format!("/orders/{order_id}")))
}
