//! Payment route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use wardrobe_core::PaymentOption;
use wardrobe_core::cart::CartOutcome;

use crate::db::OrderRepository;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::forms::PaymentForm;
use crate::middleware::{Flash, RequireAuth};
use crate::page::PageContext;
use crate::services::payment::{PaymentError, PaymentService, ready_to_pay};
use crate::state::AppState;
use crate::views::SummaryView;

/// Stripe payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub page: PageContext,
    pub summary: SummaryView,
    pub publishable_key: String,
    pub saved_cards: Vec<String>,
}

/// Display the payment page for a payment option.
#[instrument(skip_all, fields(user_id = %user.id, option = %option))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Path(option): Path<String>,
) -> Result<Response> {
    if option != PaymentOption::Stripe.slug() {
        flash.warning("This payment option is not available.").await;
        return Ok(Redirect::to("/checkout").into_response());
    }

    let orders = OrderRepository::new(state.pool());
    let Some(cart) = orders.cart_for(user.id).await? else {
        flash.warning(CartOutcome::NoActiveOrder.message()).await;
        return Ok(Redirect::to("/").into_response());
    };

    if let Err(e) = ready_to_pay(&cart) {
        flash.warning(e.user_message()).await;
        return Ok(Redirect::to(e.retry_path()).into_response());
    }

    let summary = orders.summary(&cart).await?;

    // The page still works without one-click cards
    let saved_cards = match PaymentService::new(state.pool(), state.stripe())
        .saved_cards(&user)
        .await
    {
        Ok(cards) => cards.iter().map(|card| card.label()).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not load saved cards");
            Vec::new()
        }
    };

    Ok(PaymentTemplate {
        page: PageContext::load(&state, &flash).await?,
        summary: SummaryView::new(&summary, state.stripe().currency()),
        publishable_key: state.config().stripe.publishable_key.clone(),
        saved_cards,
    }
    .into_response())
}

/// Charge the cart and place the order.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<PaymentForm>,
) -> Result<Redirect> {
    match PaymentService::new(state.pool(), state.stripe())
        .pay(&user, &form)
        .await
    {
        Ok(reference) => {
            add_breadcrumb("payment", "Order placed", Some(&[("reference", reference.as_str())]));
            flash
                .success(format!("Your order was successful! Reference: {reference}"))
                .await;
            Ok(Redirect::to("/"))
        }
        Err(e) => {
            report(&e);
            flash.warning(e.user_message()).await;
            Ok(Redirect::to(e.retry_path()))
        }
    }
}

fn report(err: &PaymentError) {
    let internal = match err {
        PaymentError::Gateway(e) => e.is_internal(),
        PaymentError::Repository(_) | PaymentError::Refunded(_) => true,
        _ => false,
    };

    if internal {
        let event_id = sentry::capture_error(err);
        tracing::error!(error = %err, sentry_event_id = %event_id, "Payment failed");
    } else {
        tracing::info!(error = %err, "Payment declined");
    }
}
