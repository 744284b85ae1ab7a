//! Refund request handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use tracing::instrument;

use crate::db::{OrderRepository, RefundRepository, RepositoryError};
use crate::error::Result;
use crate::filters;
use crate::forms::RefundForm;
use crate::middleware::{RequireAuth, flash::Flash};
use crate::page::PageContext;
use crate::state::AppState;

/// Refund form template.
#[derive(Template, WebTemplate)]
#[template(path = "request_refund.html")]
pub struct RefundTemplate {
    pub page: PageContext,
    pub email: String,
}

/// Display the refund form.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(RequireAuth(user): RequireAuth, page: PageContext) -> RefundTemplate {
    RefundTemplate {
        page,
        email: user.email.as_str().to_owned(),
    }
}

/// Record a refund request for one of the user's orders.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    flash: Flash,
    Form(form): Form<RefundForm>,
) -> Result<Redirect> {
    let back = Redirect::to("/request-refund");

    let request = match form.validate() {
        Ok(request) => request,
        Err(message) => {
            flash.warning(message).await;
            return Ok(back);
        }
    };

    let Some(order) = OrderRepository::new(state.pool())
        .ordered_by_reference(user.id, &request.ref_code)
        .await?
    else {
        flash.info("This order does not exist.").await;
        return Ok(back);
    };

    match RefundRepository::new(state.pool())
        .request(order.id, &request.reason, &request.email)
        .await
    {
        Ok(_) => flash.info("Your request was received.").await,
        Err(RepositoryError::Conflict(_)) => {
            flash
                .info("A refund was already requested for this order.")
                .await;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(back)
}
