//! Coupon pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use wardrobe_core::CouponId;

use super::{FormPage, form_error};
use crate::components::data_table::{TableRow, TableView, coupons_table_config};
use crate::db::CouponRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::CouponForm;
use crate::middleware::{Flash, RequireStaff};
use crate::models::CurrentStaff;
use crate::page::PageContext;
use crate::routes::ListTemplate;
use crate::state::AppState;

const LIST_PATH: &str = "/coupons";

/// Coupon form template.
#[derive(Template, WebTemplate)]
#[template(path = "coupon_form.html")]
pub struct CouponFormTemplate {
    pub page: PageContext,
    pub form_page: FormPage,
    pub form: CouponForm,
}

impl CouponFormTemplate {
    async fn render_with(
        staff: CurrentStaff,
        flash: &Flash,
        form_page: FormPage,
        form: CouponForm,
    ) -> Response {
        Self {
            page: PageContext::new(staff, flash, "coupons").await,
            form_page,
            form,
        }
        .into_response()
    }
}

/// List coupons.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
) -> Result<ListTemplate> {
    let coupons = CouponRepository::new(state.pool()).list().await?;
    let total = i64::try_from(coupons.len()).unwrap_or(i64::MAX);

    let rows = coupons
        .into_iter()
        .map(|c| {
            TableRow::new(c.id, vec![c.code, c.amount.to_string()])
                .link(format!("{LIST_PATH}/{}", c.id))
        })
        .collect();

    Ok(ListTemplate {
        page: PageContext::new(staff, &flash, "coupons").await,
        table: TableView::new(coupons_table_config(), rows, total, None, 1, false),
    })
}

/// Display the create form.
pub async fn new_form(RequireStaff(staff): RequireStaff, flash: Flash) -> Response {
    CouponFormTemplate::render_with(
        staff,
        &flash,
        FormPage::create("coupon", LIST_PATH),
        CouponForm::default(),
    )
    .await
}

/// Create a coupon.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Form(form): Form<CouponForm>,
) -> Result<Response> {
    let form_page = FormPage::create("coupon", LIST_PATH);
    let (code, amount) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            return Ok(
                CouponFormTemplate::render_with(staff, &flash, form_page.with_errors(errors), form)
                    .await,
            );
        }
    };

    match CouponRepository::new(state.pool()).create(&code, amount).await {
        Ok(coupon) => {
            flash
                .success(format!("The coupon \"{}\" was added successfully.", coupon.code))
                .await;
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        Err(e) => {
            let errors = form_error(e)?;
            Ok(
                CouponFormTemplate::render_with(staff, &flash, form_page.with_errors(errors), form)
                    .await,
            )
        }
    }
}

/// Display the edit form.
pub async fn edit(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Path(id): Path<CouponId>,
) -> Result<Response> {
    let coupon = CouponRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("coupon {id}")))?;

    Ok(CouponFormTemplate::render_with(
        staff,
        &flash,
        FormPage::edit("coupon", format!("{LIST_PATH}/{id}")),
        CouponForm::from(&coupon),
    )
    .await)
}

/// Update a coupon.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    flash: Flash,
    Path(id): Path<CouponId>,
    Form(form): Form<CouponForm>,
) -> Result<Response> {
    let form_page = FormPage::edit("coupon", format!("{LIST_PATH}/{id}"));
    let (code, amount) = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            return Ok(
                CouponFormTemplate::render_with(staff, &flash, form_page.with_errors(errors), form)
                    .await,
            );
        }
    };

    if let Err(e) = CouponRepository::new(state.pool()).update(id, &code, amount).await {
        let errors = form_error(e)?;
        return Ok(
            CouponFormTemplate::render_with(staff, &flash, form_page.with_errors(errors), form)
                .await,
        );
    }

    flash
        .success(format!("The coupon \"{code}\" was changed successfully."))
        .await;
    Ok(Redirect::to(LIST_PATH).into_response())
}

/// Delete a coupon.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    flash: Flash,
    Path(id): Path<CouponId>,
) -> Result<Redirect> {
    CouponRepository::new(state.pool()).delete(id).await?;
    flash.success("The coupon was deleted successfully.").await;
    Ok(Redirect::to(LIST_PATH))
}
