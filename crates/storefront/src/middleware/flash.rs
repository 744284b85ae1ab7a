//! One-shot flash messages stored in the session.
//!
//! Handlers queue a message before redirecting; the next page that renders
//! takes the queue and shows it once.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{FlashLevel, FlashMessage, session_keys};

/// Extractor giving handlers access to the flash queue.
#[derive(Clone)]
pub struct Flash(Session);

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}

impl Flash {
    /// Wrap an already extracted session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.0
    }

    /// Queue a message. Session failures are logged and the message dropped.
    pub async fn push(&self, level: FlashLevel, text: impl Into<String>) {
        let mut queue = self.pending().await;
        queue.push(FlashMessage::new(level, text));
        if let Err(e) = self.0.insert(session_keys::FLASH, &queue).await {
            tracing::warn!(error = %e, "Failed to store flash message");
        }
    }

    pub async fn info(&self, text: impl Into<String>) {
        self.push(FlashLevel::Info, text).await;
    }

    pub async fn success(&self, text: impl Into<String>) {
        self.push(FlashLevel::Success, text).await;
    }

    pub async fn warning(&self, text: impl Into<String>) {
        self.push(FlashLevel::Warning, text).await;
    }

    pub async fn error(&self, text: impl Into<String>) {
        self.push(FlashLevel::Error, text).await;
    }

    /// Remove and return every queued message.
    pub async fn take(&self) -> Vec<FlashMessage> {
        match self.0.remove::<Vec<FlashMessage>>(session_keys::FLASH).await {
            Ok(messages) => messages.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read flash messages");
                Vec::new()
            }
        }
    }

    async fn pending(&self) -> Vec<FlashMessage> {
        self.0
            .get::<Vec<FlashMessage>>(session_keys::FLASH)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn flash() -> Flash {
        Flash::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[tokio::test]
    async fn test_messages_are_shown_once_in_order() {
        let flash = flash();
        flash.success("This item was added to your cart.").await;
        flash.error("Invalid data received.").await;

        let messages = flash.take().await;
        assert_eq!(
            messages,
            vec![
                FlashMessage::new(FlashLevel::Success, "This item was added to your cart."),
                FlashMessage::new(FlashLevel::Error, "Invalid data received."),
            ]
        );
        assert!(flash.take().await.is_empty());
    }
}
