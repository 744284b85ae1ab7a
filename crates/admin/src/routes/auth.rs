//! Staff sign-in and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::LoginForm;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{Flash, clear_current_staff, set_current_staff};
use crate::models::{CurrentStaff, session_keys};
use crate::page::PageContext;
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Display the login page, or go to the dashboard if already signed in.
pub async fn login_page(session: Session, flash: Flash) -> Result<Response> {
    let staff: Option<CurrentStaff> = session.get(session_keys::CURRENT_STAFF).await?;
    if staff.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(LoginTemplate {
        page: PageContext {
            staff: None,
            messages: flash.take().await,
            active: "login",
        },
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let flash = Flash::new(session.clone());

    match AdminAuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let staff = CurrentStaff {
                id: user.id,
                email: user.email,
            };
            set_current_staff(&session, &staff).await?;
            set_sentry_user(&staff.id, Some(staff.email.as_str()));
            tracing::info!(user_id = %staff.id, "Staff member logged in");
            Ok(Redirect::to("/"))
        }
        Err(e) => {
            match &e {
                AdminAuthError::Repository(_) => {
                    tracing::error!(error = %e, "Staff login failed");
                }
                _ => tracing::info!(error = %e, "Staff login rejected"),
            }
            flash.error(e.user_message()).await;
            Ok(Redirect::to(LOGIN_PATH))
        }
    }
}

/// Sign out and return to the login page.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_staff(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to(LOGIN_PATH))
}
