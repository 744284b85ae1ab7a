//! Category pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use wardrobe_core::CategoryId;

use super::FormPage;
use crate::components::data_table::{TableRow, TableView, categories_table_config};
use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::CategoryForm;
use crate::middleware::{Flash, RequireStaff};
use crate::page::PageContext;
use crate::routes::ListTemplate;
use crate::state::AppState;

const LIST_PATH: &str = "/categories";

/// Category form template.
#[derive(Template, WebTemplate)]
#[template(path = "category_form.html")]
pub struct CategoryFormTemplate {
    pub page: PageContext,
    pub form_page: FormPage,
    pub form: CategoryForm,
}

/// List categories.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
) -> Result<ListTemplate> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let total = i64::try_from(categories.len()).unwrap_or(i64::MAX);

    let rows = categories
        .into_iter()
        .map(|c| TableRow::new(c.id, vec![c.title]).link(format!("{LIST_PATH}/{}", c.id)))
        .collect();

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "categories").await,
        table: TableView::new(categories_table_config(), rows, total, None, 1, false),
    })
}

/// Display the create form.
pub async fn new_form(RequireStaff(staff): RequireStaff, flash: Flash) -> CategoryFormTemplate {
    CategoryFormTemplate {
        page: PageContext::new(staff, &flash, "categories").await,
        form_page: FormPage::create("category", LIST_PATH),
        form: CategoryForm::default(),
    }
}

/// Create a category.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let form_page = FormPage::create("category", LIST_PATH);
    let title = match form.validate() {
        Ok(title) => title,
        Err(errors) => {
            return Ok(CategoryFormTemplate {
                page: PageContext::new(staff, &flash, "categories").await,
                form_page: form_page.with_errors(errors),
                form,
            }
            .into_response());
        }
    };

    let category = CategoryRepository::new(state.pool()).create(&title).await?;
    flash
        .success(format!("The category \"{}\" was added successfully.", category.title))
        .await;
    Ok(Redirect::to(LIST_PATH).into_response())
}

/// Display the edit form.
pub async fn edit(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Path(id): Path<CategoryId>,
) -> Result<CategoryFormTemplate> {
    let category = CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    Ok(CategoryFormTemplate {
        page: PageContext::new(staff, &flash, "categories").await,
        form_page: FormPage::edit("category", format!("{LIST_PATH}/{id}")),
        form: CategoryForm::from(&category),
    })
}

/// Rename a category.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let form_page = FormPage::edit("category", format!("{LIST_PATH}/{id}"));
    let title = match form.validate() {
        Ok(title) => title,
        Err(errors) => {
            return Ok(CategoryFormTemplate {
                page: PageContext::new(staff, &flash, "categories").await,
                form_page: form_page.with_errors(errors),
                form,
            }
            .into_response());
        }
    };

    CategoryRepository::new(state.pool()).update(id, &title).await?;

    flash
        .success(format!("The category \"{title}\" was changed successfully."))
        .await;
    Ok(Redirect::to(LIST_PATH).into_response())
}

/// Delete a category together with its items.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    flash: Flash,
    Path(id): Path<CategoryId>,
) -> Result<Redirect> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    flash.success("The category was deleted successfully.").await;
    Ok(Redirect::to(LIST_PATH))
}
