//! User management commands.

use thiserror::Error;

use wardrobe_storefront::services::auth::{AuthError, AuthService};

use super::CommandError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Create a user with a password and an empty profile.
///
/// # Errors
///
/// Returns an error if the email is invalid or taken, the password is too
/// short, or the database is unreachable.
pub async fn create(email: &str, password: &str, staff: bool) -> Result<(), UserError> {
    let pool = super::connect().await?;

    let user = AuthService::new(&pool)
        .register_with_password(email, password, staff)
        .await?;

    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        staff,
        "User created"
    );
    Ok(())
}
