//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.
//! Collaborators are built once at startup and injected here.

use crate::config::Config;
use crate::rate_limit::RateLimiter;
use shared::engine::{EmailPolicy, MetricsEngine};
use shared::notify::{HttpMailNotifier, NotifyError, Notifier};
use shared::storage::{FileReportStore, InMemoryReportStore, ReportStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Computes metrics records.
    engine: MetricsEngine,
    /// The report persistence backend.
    report_store: Arc<dyn ReportStore>,
    /// Report delivery, when enabled.
    notifier: Option<Arc<dyn Notifier>>,
    /// Fixed notification recipient overriding the submitter's address.
    notify_to: Option<String>,
    /// Submission rate limiter, when enabled.
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// Creates a new application state with the given engine and store.
    pub fn new(engine: MetricsEngine, report_store: Arc<dyn ReportStore>) -> Self {
        Self {
            engine,
            report_store,
            notifier: None,
            notify_to: None,
            rate_limiter: None,
        }
    }

    /// Builds the state described by a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the mail relay client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        let policy = if config.require_email {
            EmailPolicy::Required
        } else {
            EmailPolicy::Optional
        };
        let engine = MetricsEngine::new().with_email_policy(policy);
        let store = Arc::new(FileReportStore::new(&config.data_dir, config.storage_format));
        let mut state = Self::new(engine, store);

        if let Some(ref mail) = config.mail {
            let mut notifier = HttpMailNotifier::new(&mail.relay_url, &mail.from)?;
            if let Some(ref token) = mail.token {
                notifier = notifier.with_token(token);
            }
            state = state.with_notifier(Arc::new(notifier), mail.to.clone());
        }

        if let Some(limit) = config.rate_limit {
            state = state.with_rate_limiter(Arc::new(RateLimiter::new(limit)));
        }

        Ok(state)
    }

    /// Creates a new application state with an in-memory store and no
    /// optional collaborators.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self::new(MetricsEngine::new(), InMemoryReportStore::new_shared())
    }

    /// Enables report delivery. `to` overrides the submitter's address.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, to: Option<String>) -> Self {
        self.notifier = Some(notifier);
        self.notify_to = to;
        self
    }

    /// Enables submission rate limiting.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Returns the metrics engine.
    #[must_use]
    pub fn engine(&self) -> &MetricsEngine {
        &self.engine
    }

    /// Returns a reference to the report store.
    #[must_use]
    pub fn report_store(&self) -> &dyn ReportStore {
        self.report_store.as_ref()
    }

    /// Returns the notifier, if delivery is enabled.
    #[must_use]
    pub fn notifier(&self) -> Option<&dyn Notifier> {
        self.notifier.as_deref()
    }

    /// Returns the recipient for a submission: the configured override, else
    /// the submitter's own address.
    #[must_use]
    pub fn recipient<'a>(&'a self, submitter: Option<&'a str>) -> Option<&'a str> {
        self.notify_to.as_deref().or(submitter)
    }

    /// Returns the rate limiter, if enabled.
    #[must_use]
    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.rate_limiter.as_deref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
