//! Item pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use wardrobe_core::models::Category;
use wardrobe_core::{ItemId, ItemLabel};

use super::{FormPage, form_error};
use crate::components::data_table::{TableRow, TableView, items_table_config};
use crate::db::items::ItemRow;
use crate::db::{CategoryRepository, ItemRepository, Paging, search_pattern};
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::ItemForm;
use crate::middleware::{Flash, RequireStaff};
use crate::models::CurrentStaff;
use crate::page::PageContext;
use crate::routes::{ListQuery, ListTemplate, or_dash};
use crate::state::AppState;

const LIST_PATH: &str = "/items";

/// Item form template.
#[derive(Template, WebTemplate)]
#[template(path = "item_form.html")]
pub struct ItemFormTemplate {
    pub page: PageContext,
    pub form_page: FormPage,
    pub form: ItemForm,
    pub categories: Vec<Category>,
    pub labels: &'static [ItemLabel],
}

impl ItemFormTemplate {
    async fn render_with(
        state: &AppState,
        staff: CurrentStaff,
        flash: &Flash,
        form_page: FormPage,
        form: ItemForm,
    ) -> Result<Response> {
        let categories = CategoryRepository::new(state.pool()).list().await?;
        Ok(Self {
            page: PageContext::new(staff, flash, "items").await,
            form_page,
            form,
            categories,
            labels: &ItemLabel::ALL,
        }
        .into_response())
    }
}

fn item_row(item: ItemRow) -> TableRow {
    let href = format!("{LIST_PATH}/{}", item.id);
    TableRow::new(
        item.id,
        vec![
            item.title,
            item.category_title,
            item.price.to_string(),
            or_dash(item.discount_price),
            item.label.title().to_owned(),
            item.quantity.to_string(),
            item.slug,
        ],
    )
    .link(href)
}

/// List items, optionally searching titles.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Query(query): Query<ListQuery>,
) -> Result<ListTemplate> {
    let paging = Paging::new(query.page);
    let pattern = search_pattern(query.q.as_deref());
    let repo = ItemRepository::new(state.pool());

    let items = repo.list(pattern.as_deref(), paging).await?;
    let total = repo.count(pattern.as_deref()).await?;

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "items").await,
        table: TableView::new(
            items_table_config(),
            items.into_iter().map(item_row).collect(),
            total,
            query.q.as_deref(),
            paging.page,
            paging.has_next(total),
        ),
    })
}

/// Display the create form.
pub async fn new_form(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
) -> Result<Response> {
    let form = ItemForm {
        quantity: "1".to_owned(),
        ..ItemForm::default()
    };
    ItemFormTemplate::render_with(&state, staff, &flash, FormPage::create("item", LIST_PATH), form)
        .await
}

/// Create an item.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    let form_page = FormPage::create("item", LIST_PATH);
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return ItemFormTemplate::render_with(
                &state,
                staff,
                &flash,
                form_page.with_errors(errors),
                form,
            )
            .await;
        }
    };

    match ItemRepository::new(state.pool()).create(&input).await {
        Ok(_) => {
            flash
                .success(format!("The item \"{}\" was added successfully.", input.title))
                .await;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => {
            let errors = form_error(e)?;
            ItemFormTemplate::render_with(&state, staff, &flash, form_page.with_errors(errors), form)
                .await
        }
    }
}

/// Display the edit form.
pub async fn edit(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Path(id): Path<ItemId>,
) -> Result<Response> {
    let item = ItemRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {id}")))?;

    ItemFormTemplate::render_with(
        &state,
        staff,
        &flash,
        FormPage::edit("item", format!("{LIST_PATH}/{id}")),
        ItemForm::from(&item),
    )
    .await
}

/// Update an item.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Path(id): Path<ItemId>,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    let form_page = FormPage::edit("item", format!("{LIST_PATH}/{id}"));
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return ItemFormTemplate::render_with(
                &state,
                staff,
                &flash,
                form_page.with_errors(errors),
                form,
            )
            .await;
        }
    };

    if let Err(e) = ItemRepository::new(state.pool()).update(id, &input).await {
        let errors = form_error(e)?;
        return ItemFormTemplate::render_with(
            &state,
            staff,
            &flash,
            form_page.with_errors(errors),
            form,
        )
        .await;
    }

    flash
        .success(format!("The item \"{}\" was changed successfully.", input.title))
        .await;
    Ok(Redirect::to(LIST_PATH).into_response())
}

/// Delete an item. Its cart lines go with it.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    flash: Flash,
    Path(id): Path<ItemId>,
) -> Result<Redirect> {
    ItemRepository::new(state.pool()).delete(id).await?;
    flash.success("The item was deleted successfully.").await;
    Ok(Redirect::to(LIST_PATH))
}
