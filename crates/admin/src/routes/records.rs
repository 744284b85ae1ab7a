//! Read-only record lists.

use axum::extract::{Query, State};
use tracing::instrument;

use crate::components::data_table::{
    DataTableConfig, TableRow, TableView, addresses_table_config, flag_cell,
    order_items_table_config, payments_table_config, profiles_table_config,
};
use crate::db::records::{AddressRow, OrderItemRow, PaymentRow, ProfileRow};
use crate::db::{Paging, RecordRepository};
use crate::error::Result;
use crate::middleware::{Flash, RequireStaff};
use crate::page::PageContext;
use crate::routes::{ListQuery, ListTemplate, or_dash};
use crate::state::AppState;

fn address_row(address: AddressRow) -> TableRow {
    TableRow::new(
        address.id,
        vec![
            address.user_email.to_string(),
            address.street_address,
            address.apartment_address,
            address.country.name().to_owned(),
            address.zip,
            address.kind.title().to_owned(),
            flag_cell(address.is_default).to_owned(),
        ],
    )
}

fn payment_row(payment: PaymentRow) -> TableRow {
    TableRow::new(
        payment.id,
        vec![
            payment.stripe_charge_id,
            or_dash(payment.user_email),
            payment.amount.to_string(),
            payment.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ],
    )
}

fn profile_row(profile: ProfileRow) -> TableRow {
    TableRow::new(
        profile.user_id,
        vec![
            profile.user_email.to_string(),
            or_dash(profile.stripe_customer_id),
            flag_cell(profile.one_click_purchasing).to_owned(),
        ],
    )
}

fn order_item_row(line: OrderItemRow) -> TableRow {
    TableRow::new(
        line.id,
        vec![
            line.user_email.to_string(),
            format!("#{}", line.order_id),
            line.item_title,
            line.quantity.to_string(),
            flag_cell(line.ordered).to_owned(),
        ],
    )
    .link(format!("/orders/{}", line.order_id))
}

fn page_view(
    config: DataTableConfig,
    rows: Vec<TableRow>,
    total: i64,
    paging: Paging,
) -> TableView {
    TableView::new(config, rows, total, None, paging.page, paging.has_next(total))
}

#[instrument(skip_all)]
pub async fn addresses(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> Result<ListTemplate> {
    let paging = Paging::new(query.page);
    let (rows, total) = RecordRepository::new(state.pool()).addresses(paging).await?;

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "addresses").await,
        table: page_view(
            addresses_table_config(),
            rows.into_iter().map(address_row).collect(),
            total,
            paging,
        ),
    })
}

#[instrument(skip_all)]
pub async fn payments(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> Result<ListTemplate> {
    let paging = Paging::new(query.page);
    let (rows, total) = RecordRepository::new(state.pool()).payments(paging).await?;

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "payments").await,
        table: page_view(
            payments_table_config(),
            rows.into_iter().map(payment_row).collect(),
            total,
            paging,
        ),
    })
}

#[instrument(skip_all)]
pub async fn profiles(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> Result<ListTemplate> {
    let paging = Paging::new(query.page);
    let (rows, total) = RecordRepository::new(state.pool()).profiles(paging).await?;

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "profiles").await,
        table: page_view(
            profiles_table_config(),
            rows.into_iter().map(profile_row).collect(),
            total,
            paging,
        ),
    })
}

#[instrument(skip_all)]
pub async fn order_items(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> Result<ListTemplate> {
    let paging = Paging::new(query.page);
    let (rows, total) = RecordRepository::new(state.pool()).order_items(paging).await?;

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "order_items").await,
        table: page_view(
            order_items_table_config(),
            rows.into_iter().map(order_item_row).collect(),
            total,
            paging,
        ),
    })
}
