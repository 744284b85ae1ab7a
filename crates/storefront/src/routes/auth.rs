//! Account route handlers: login, signup, logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::safe_next;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::{LoginForm, SignupForm};
use crate::middleware::auth::login_url;
use crate::middleware::{Flash, OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::page::PageContext;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub next: String,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(
        session,
        &CurrentUser {
            id: user.id,
            email: user.email.clone(),
        },
    )
    .await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

fn log_auth_failure(err: &AuthError) {
    match err {
        AuthError::Repository(_) | AuthError::PasswordHash => {
            tracing::error!(error = %err, "Authentication failed");
        }
        _ => tracing::info!(error = %err, "Authentication rejected"),
    }
}

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    flash: Flash,
    Query(query): Query<NextQuery>,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(LoginTemplate {
        page: PageContext::load(&state, &flash).await?,
        next: safe_next(query.next.as_deref()).to_owned(),
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
    let next = safe_next(form.next.as_deref()).to_owned();

    match AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            flash
                .success(format!("Successfully signed in as {}.", user.email))
                .await;
            Ok(Redirect::to(&next))
        }
        Err(e) => {
            log_auth_failure(&e);
            flash.error(e.user_message()).await;
            Ok(Redirect::to(&login_url(&next)))
        }
    }
}

/// Display the signup page.
pub async fn signup_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    flash: Flash,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(SignupTemplate {
        page: PageContext::load(&state, &flash).await?,
    }
    .into_response())
}

/// Handle signup form submission.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Redirect> {
    let flash = Flash::new(session.clone());

    if let Err(message) = form.validate() {
        flash.error(message).await;
        return Ok(Redirect::to("/accounts/signup"));
    }

    match AuthService::new(state.pool())
        .register_with_password(&form.email, &form.password, false)
        .await
    {
        Ok(user) => {
            start_session(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User signed up");
            flash
                .success(format!("Successfully signed in as {}.", user.email))
                .await;
            Ok(Redirect::to("/"))
        }
        Err(e) => {
            log_auth_failure(&e);
            flash.error(e.user_message()).await;
            Ok(Redirect::to("/accounts/signup"))
        }
    }
}

/// Log out and return to the catalog.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Flash::new(session).info("You have signed out.").await;
    Ok(Redirect::to("/"))
}
