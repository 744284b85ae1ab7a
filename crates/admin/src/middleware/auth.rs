//! Authentication extractors for admin.
//!
//! Every panel page except the login form requires a staff session.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentStaff, session_keys};

/// Path of the admin login page.
pub const LOGIN_PATH: &str = "/login";

/// Extractor that requires a signed-in staff member.
///
/// ```rust,ignore
/// async fn dashboard(RequireStaff(staff): RequireStaff) -> impl IntoResponse {
///     format!("Hello, {}!", staff.email)
/// }
/// ```
pub struct RequireStaff(pub CurrentStaff);

/// Rejection for [`RequireStaff`].
#[derive(Debug)]
pub enum StaffRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// No session layer is installed.
    SessionMissing,
}

impl IntoResponse for StaffRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::SessionMissing => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = StaffRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(StaffRejection::SessionMissing)?;

        let staff: CurrentStaff = session
            .get(session_keys::CURRENT_STAFF)
            .await
            .ok()
            .flatten()
            .ok_or(StaffRejection::RedirectToLogin)?;

        Ok(Self(staff))
    }
}

/// Store the signed-in staff member, cycling the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_staff(
    session: &Session,
    staff: &CurrentStaff,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_STAFF, staff).await
}

/// Sign out by flushing the whole session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_current_staff(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;

    #[tokio::test]
    async fn test_anonymous_request_redirects_to_login() {
        let app = Router::new()
            .route("/", get(|RequireStaff(staff): RequireStaff| async move { staff.email.to_string() }))
            .layer(SessionManagerLayer::new(MemoryStore::default()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), LOGIN_PATH);
    }
}
