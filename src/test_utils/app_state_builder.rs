use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::validators::{FilterPolicy, SubscriptionValidator},
    domain::entities::{month::Month, subscription::Subscription},
    infra::config::{AppConfig, LogFormat, LogLevel},
    use_cases::subscription::{SubscriptionRepo, SubscriptionUseCases},
};

use super::InMemorySubscriptionRepo;

/// Builds an `AppState` backed by the in-memory repository.
pub struct TestAppStateBuilder {
    subscriptions: Vec<Subscription>,
    policy: FilterPolicy,
    current_month: Option<Month>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            policy: FilterPolicy::Lenient,
            current_month: None,
        }
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    pub fn with_policy(mut self, policy: FilterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pin "now" so future-date checks are deterministic.
    pub fn with_current_month(mut self, month: Month) -> Self {
        self.current_month = Some(month);
        self
    }

    pub fn build(self) -> AppState {
        let config = AppConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: SecretString::new("postgres://test".into()),
            db_max_connections: 1,
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            log_level: LogLevel::Info,
            log_format: LogFormat::Pretty,
            log_file: None,
            filter_policy: self.policy,
        };

        let mut validator = SubscriptionValidator::new(self.policy);
        if let Some(month) = self.current_month {
            validator = validator.with_current_month(month);
        }

        let repo = Arc::new(InMemorySubscriptionRepo::with_subscriptions(
            self.subscriptions,
        ));
        let use_cases =
            SubscriptionUseCases::new(repo as Arc<dyn SubscriptionRepo>, Arc::new(validator));

        AppState {
            config: Arc::new(config),
            subscription_use_cases: Arc::new(use_cases),
        }
    }
}
