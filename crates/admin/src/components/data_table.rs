//! Data table component types.
//!
//! Every admin list renders through `list.html`: a [`DataTableConfig`]
//! describes the columns, select filters and bulk actions, and handlers fill
//! a [`TableView`] with pre-rendered rows for one page.

use serde::Serialize;

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
}

impl TableColumn {
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Option for select filters.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Single-select filter, submitted as a query parameter.
#[derive(Debug, Clone, Serialize)]
pub struct TableFilter {
    /// Filter parameter key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Available options; the empty value means "all".
    pub options: Vec<FilterOption>,
    /// Currently selected value, empty when unfiltered.
    pub selected: String,
}

impl TableFilter {
    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            options,
            selected: String::new(),
        }
    }

    /// A yes/no filter over a boolean flag.
    #[must_use]
    pub fn flag(key: &str, label: &str) -> Self {
        Self::select(
            key,
            label,
            vec![FilterOption::new("yes", "Yes"), FilterOption::new("no", "No")],
        )
    }
}

/// Bulk action definition for data tables.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAction {
    /// Action key posted as `action`.
    pub key: String,
    /// Display label.
    pub label: String,
}

impl BulkAction {
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize)]
pub struct DataTableConfig {
    /// Unique table identifier, also the list's URL path segment.
    pub table_id: String,
    /// Page heading.
    pub title: String,
    pub columns: Vec<TableColumn>,
    pub filters: Vec<TableFilter>,
    pub bulk_actions: Vec<BulkAction>,
    /// Search box placeholder; `None` hides the search box.
    pub search_placeholder: Option<String>,
    /// Message shown when there are no rows.
    pub empty_title: String,
    /// Link to the create form, for editable tables.
    pub create_href: Option<String>,
}

impl DataTableConfig {
    #[must_use]
    pub fn new(table_id: &str, title: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            title: title.to_string(),
            columns: vec![],
            filters: vec![],
            bulk_actions: vec![],
            search_placeholder: None,
            empty_title: "Nothing here yet".to_string(),
            create_href: None,
        }
    }

    #[must_use]
    pub fn column(mut self, key: &str, label: &str) -> Self {
        self.columns.push(TableColumn::new(key, label));
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn bulk_action(mut self, action: BulkAction) -> Self {
        self.bulk_actions.push(action);
        self
    }

    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = Some(placeholder.to_string());
        self
    }

    #[must_use]
    pub fn empty_state(mut self, title: &str) -> Self {
        self.empty_title = title.to_string();
        self
    }

    #[must_use]
    pub fn create_link(mut self, href: &str) -> Self {
        self.create_href = Some(href.to_string());
        self
    }

    /// Whether rows get a selection checkbox.
    #[must_use]
    pub fn has_bulk_actions(&self) -> bool {
        !self.bulk_actions.is_empty()
    }

    /// Mark the selected option of each filter from the request's values.
    #[must_use]
    pub fn with_selected(mut self, values: &[(&str, Option<&str>)]) -> Self {
        for filter in &mut self.filters {
            if let Some((_, Some(value))) = values.iter().find(|(key, _)| *key == filter.key) {
                filter.selected = (*value).to_string();
            }
        }
        self
    }
}

/// One rendered table row.
#[derive(Debug, Clone)]
pub struct TableRow {
    /// Record ID, posted by bulk actions.
    pub id: String,
    /// Detail or edit page.
    pub href: Option<String>,
    /// Cell text, one per column.
    pub cells: Vec<String>,
}

impl TableRow {
    #[must_use]
    pub fn new(id: impl ToString, cells: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            href: None,
            cells,
        }
    }

    #[must_use]
    pub fn link(mut self, href: String) -> Self {
        self.href = Some(href);
        self
    }
}

/// A page of a data table, ready for `list.html`.
#[derive(Debug, Clone)]
pub struct TableView {
    pub config: DataTableConfig,
    pub rows: Vec<TableRow>,
    pub total: i64,
    pub search: String,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl TableView {
    /// Build the view, linking the neighbouring pages with the same filters.
    #[must_use]
    pub fn new(
        config: DataTableConfig,
        rows: Vec<TableRow>,
        total: i64,
        search: Option<&str>,
        page: i64,
        has_next: bool,
    ) -> Self {
        let search = search.unwrap_or_default().trim().to_string();
        let page_href = |target: i64| {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            if !search.is_empty() {
                query.append_pair("q", &search);
            }
            for filter in config.filters.iter().filter(|f| !f.selected.is_empty()) {
                query.append_pair(&filter.key, &filter.selected);
            }
            query.append_pair("page", &target.to_string());
            format!("/{}?{}", config.table_id, query.finish())
        };

        let prev_href = (page > 1).then(|| page_href(page - 1));
        let next_href = has_next.then(|| page_href(page + 1));

        Self {
            config,
            rows,
            total,
            search,
            prev_href,
            next_href,
        }
    }
}

/// Parse a yes/no filter value.
#[must_use]
pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("yes") => Some(true),
        Some("no") => Some(false),
        _ => None,
    }
}

/// Cell text for a boolean flag.
#[must_use]
pub const fn flag_cell(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Orders table: the five status flags are filterable, and the refund
/// grant is the one bulk action.
#[must_use]
pub fn orders_table_config() -> DataTableConfig {
    DataTableConfig::new("orders", "Orders")
        .column("user", "User")
        .column("reference", "Reference")
        .column("ordered", "Ordered")
        .column("being_delivered", "Being delivered")
        .column("received", "Received")
        .column("refund_requested", "Refund requested")
        .column("refund_granted", "Refund granted")
        .column("shipping_address", "Shipping address")
        .column("billing_address", "Billing address")
        .column("payment", "Payment")
        .column("coupon", "Coupon")
        .filter(TableFilter::flag("ordered", "Ordered"))
        .filter(TableFilter::flag("being_delivered", "Being delivered"))
        .filter(TableFilter::flag("received", "Received"))
        .filter(TableFilter::flag("refund_requested", "Refund requested"))
        .filter(TableFilter::flag("refund_granted", "Refund granted"))
        .bulk_action(BulkAction::new(
            "grant_refund",
            "Update orders to refund granted",
        ))
        .search_placeholder("Search by user email or reference code...")
        .empty_state("No orders found")
}

#[must_use]
pub fn items_table_config() -> DataTableConfig {
    DataTableConfig::new("items", "Items")
        .column("title", "Title")
        .column("category", "Category")
        .column("price", "Price")
        .column("discount_price", "Discount price")
        .column("label", "Label")
        .column("quantity", "Quantity")
        .column("slug", "Slug")
        .search_placeholder("Search by title...")
        .empty_state("No items found")
        .create_link("/items/new")
}

#[must_use]
pub fn categories_table_config() -> DataTableConfig {
    DataTableConfig::new("categories", "Categories")
        .column("title", "Title")
        .empty_state("No categories yet")
        .create_link("/categories/new")
}

#[must_use]
pub fn coupons_table_config() -> DataTableConfig {
    DataTableConfig::new("coupons", "Coupons")
        .column("code", "Code")
        .column("amount", "Amount")
        .empty_state("No coupons yet")
        .create_link("/coupons/new")
}

#[must_use]
pub fn refunds_table_config() -> DataTableConfig {
    DataTableConfig::new("refunds", "Refund requests")
        .column("order", "Order")
        .column("email", "Email")
        .column("reason", "Reason")
        .column("accepted", "Accepted")
        .empty_state("No refund requests")
}

#[must_use]
pub fn addresses_table_config() -> DataTableConfig {
    DataTableConfig::new("addresses", "Addresses")
        .column("user", "User")
        .column("street_address", "Street address")
        .column("apartment_address", "Apartment address")
        .column("country", "Country")
        .column("zip", "Zip")
        .column("kind", "Address type")
        .column("default", "Default")
        .empty_state("No addresses")
}

#[must_use]
pub fn payments_table_config() -> DataTableConfig {
    DataTableConfig::new("payments", "Payments")
        .column("charge", "Stripe charge")
        .column("user", "User")
        .column("amount", "Amount")
        .column("created", "Created")
        .empty_state("No payments")
}

#[must_use]
pub fn profiles_table_config() -> DataTableConfig {
    DataTableConfig::new("profiles", "User profiles")
        .column("user", "User")
        .column("stripe_customer", "Stripe customer")
        .column("one_click", "One-click purchasing")
        .empty_state("No profiles")
}

#[must_use]
pub fn order_items_table_config() -> DataTableConfig {
    DataTableConfig::new("order-items", "Order items")
        .column("user", "User")
        .column("order", "Order")
        .column("item", "Item")
        .column("quantity", "Quantity")
        .column("ordered", "Ordered")
        .empty_state("No order items")
}
