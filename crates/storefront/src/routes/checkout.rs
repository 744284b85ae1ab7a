//! Checkout route handlers.
//!
//! The checkout form is validated into a plan before anything is written;
//! every customer-facing problem becomes a flash message and a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use wardrobe_core::cart::CartOutcome;
use wardrobe_core::{AddressKind, countries};

use crate::db::{AddressRepository, CouponRepository, OrderRepository, RepositoryError};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::forms::{CheckoutForm, CouponForm, SavedDefaults};
use crate::middleware::{Flash, RequireAuth};
use crate::models::CurrentUser;
use crate::page::PageContext;
use crate::state::AppState;
use crate::views::{AddressView, SummaryView};

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub summary: SummaryView,
    pub default_shipping: Option<AddressView>,
    pub default_billing: Option<AddressView>,
    pub countries: &'static [(&'static str, &'static str)],
}

async fn saved_defaults(state: &AppState, user: &CurrentUser) -> Result<SavedDefaults> {
    let addresses = AddressRepository::new(state.pool());
    Ok(SavedDefaults {
        shipping: addresses.default_for(user.id, AddressKind::Shipping).await?,
        billing: addresses.default_for(user.id, AddressKind::Billing).await?,
    })
}

/// Display the checkout form.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool());
    let Some(cart) = orders.cart_for(user.id).await? else {
        flash.warning(CartOutcome::NoActiveOrder.message()).await;
        return Ok(Redirect::to("/").into_response());
    };

    let summary = orders.summary(&cart).await?;
    let defaults = saved_defaults(&state, &user).await?;

    Ok(CheckoutTemplate {
        page: PageContext::load(&state, &flash).await?,
        summary: SummaryView::new(&summary, state.stripe().currency()),
        default_shipping: defaults.shipping.as_ref().map(AddressView::from),
        default_billing: defaults.billing.as_ref().map(AddressView::from),
        countries: countries(),
    }
    .into_response())
}

/// Save the checkout addresses and continue to the chosen payment page.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect> {
    let orders = OrderRepository::new(state.pool());
    let Some(cart) = orders.cart_for(user.id).await? else {
        flash.warning(CartOutcome::NoActiveOrder.message()).await;
        return Ok(Redirect::to("/"));
    };

    let defaults = saved_defaults(&state, &user).await?;
    let plan = match form.validate(&defaults) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::debug!(error = %e, "Checkout form rejected");
            flash.warning(e.to_string()).await;
            return Ok(Redirect::to("/checkout"));
        }
    };

    match orders
        .apply_checkout(&cart, &plan.shipping, &plan.billing)
        .await
    {
        Ok(()) => {}
        Err(RepositoryError::NotFound) => {
            flash
                .warning("The selected address is no longer available.")
                .await;
            return Ok(Redirect::to("/checkout"));
        }
        Err(e) => return Err(e.into()),
    }

    add_breadcrumb("checkout", "Addresses saved", None);
    Ok(Redirect::to(&format!(
        "/payment/{}",
        plan.payment_option.slug()
    )))
}

/// Attach a coupon to the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add_coupon(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<CouponForm>,
) -> Result<Redirect> {
    let code = match form.validate() {
        Ok(code) => code,
        Err(message) => {
            flash.info(message).await;
            return Ok(Redirect::to("/checkout"));
        }
    };

    let orders = OrderRepository::new(state.pool());
    let Some(cart) = orders.cart_for(user.id).await? else {
        flash.info(CartOutcome::NoActiveOrder.message()).await;
        return Ok(Redirect::to("/checkout"));
    };

    let Some(coupon) = CouponRepository::new(state.pool()).get_by_code(code).await? else {
        flash.info("This coupon does not exist.").await;
        return Ok(Redirect::to("/checkout"));
    };

    orders.set_coupon(cart.id, coupon.id).await?;
    tracing::info!(order_id = %cart.id, coupon = %coupon.code, "Coupon applied");

    flash.success("Successfully added coupon.").await;
    Ok(Redirect::to("/checkout"))
}
