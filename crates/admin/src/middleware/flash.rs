//! One-shot flash messages stored in the session.

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
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Queue a message. Session failures are logged and the message dropped.
    pub async fn push(&self, level: FlashLevel, text: impl Into<String>) {
        let mut queue: Vec<FlashMessage> = self
            .0
            .get(session_keys::FLASH)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        queue.push(FlashMessage::new(level, text));
        if let Err(e) = self.0.insert(session_keys::FLASH, &queue).await {
            tracing::warn!(error = %e, "Failed to store flash message");
        }
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
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_take_empties_queue() {
        let flash = Flash::new(Session::new(None, Arc::new(MemoryStore::default()), None));
        flash.success("The category was saved.").await;
        flash.warning("No orders selected.").await;

        let messages = flash.take().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.last().map(|m| m.level), Some(FlashLevel::Warning));
        assert!(flash.take().await.is_empty());
    }
}
