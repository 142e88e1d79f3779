//! Report delivery.
//!
//! The `Notifier` trait hands a rendered report to a delivery channel.
//! `HttpMailNotifier` posts to an HTTP mail relay; `InMemoryNotifier` keeps an
//! outbox for development and testing.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Failed to acquire lock on the outbox.
    #[error("Failed to acquire lock on outbox")]
    LockError,

    /// The relay could not be reached.
    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay answered with a non-success status.
    #[error("Mail relay rejected message with status {status}: {body}")]
    Rejected {
        /// HTTP status returned by the relay.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
}

/// A message to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Destination address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl Notification {
    /// Creates a notification.
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Trait for notification delivery.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a single notification.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Delivers notifications through an HTTP mail relay.
///
/// Each message is sent as a JSON `POST` of `{from, to, subject, text}`.
#[derive(Debug, Clone)]
pub struct HttpMailNotifier {
    client: reqwest::Client,
    endpoint: String,
    from: String,
    token: Option<String>,
}

impl HttpMailNotifier {
    /// Request timeout for a single relay call.
    pub const TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a notifier for the given relay endpoint and sender address.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, from: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(Self::TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            from: from.into(),
            token: None,
        })
    }

    /// Sets a bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Returns the relay endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for HttpMailNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = RelayMessage {
            from: &self.from,
            to: &notification.to,
            subject: &notification.subject,
            text: &notification.body,
        };

        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %notification.to, "Notification delivered to relay");
        Ok(())
    }
}

/// Notifier that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
    fail: bool,
}

impl InMemoryNotifier {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier whose every delivery fails, for exercising error paths.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// Returns the delivered notifications in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn sent(&self) -> Result<Vec<Notification>, NotifyError> {
        let sent = self.sent.read().map_err(|_| NotifyError::LockError)?;
        Ok(sent.clone())
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Rejected {
                status: 503,
                body: "outbox unavailable".to_string(),
            });
        }
        let mut sent = self.sent.write().map_err(|_| NotifyError::LockError)?;
        sent.push(notification.clone());
        Ok(())
    }
}
