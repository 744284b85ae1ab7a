//! Per-request data every rendered page needs.
//!
//! The navbar shows the logged-in user and their cart size; the layout shows
//! queued flash messages. Extracting [`PageContext`] consumes the flash queue,
//! so handlers that may redirect instead call [`PageContext::load`] once they
//! know they will render.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::Flash;
use crate::models::{CurrentUser, FlashMessage, session_keys};
use crate::state::AppState;

/// Layout context shared by all page templates.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub messages: Vec<FlashMessage>,
    pub cart_count: i64,
}

impl PageContext {
    /// Whether a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl PageContext {
    /// Load the layout context, consuming queued flash messages.
    ///
    /// Handlers that may still redirect call this only once they know they
    /// will render, so the messages survive the redirect.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if the session or the database fails.
    pub async fn load(state: &AppState, flash: &Flash) -> Result<Self, AppError> {
        let user: Option<CurrentUser> = flash.session().get(session_keys::CURRENT_USER).await?;
        let messages = flash.take().await;

        let cart_count = match &user {
            Some(user) => {
                OrderRepository::new(state.pool())
                    .cart_line_count(user.id)
                    .await?
            }
            None => 0,
        };

        Ok(Self {
            user,
            messages,
            cart_count,
        })
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>().cloned() {
            Some(session) => Self::load(state, &Flash::new(session)).await,
            None => Ok(Self::default()),
        }
    }
}
