//! In-memory mock implementation of the subscription repository.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{SubscriptionPatch, SubscriptionRepo},
    domain::entities::{
        subscription::{NewSubscription, Subscription},
        subscription_filter::SubscriptionFilter,
    },
};

/// In-memory implementation of SubscriptionRepo for testing.
///
/// Rows are keyed by id, so iteration is insertion order just like
/// `ORDER BY id`. Filtering evaluates the same clause list the Postgres
/// adapter renders to SQL.
pub struct InMemorySubscriptionRepo {
    pub subscriptions: Mutex<BTreeMap<i64, Subscription>>,
    next_id: AtomicI64,
    queries: AtomicUsize,
}

impl Default for InMemorySubscriptionRepo {
    fn default() -> Self {
        Self {
            subscriptions: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            queries: AtomicUsize::new(0),
        }
    }
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial subscriptions for testing.
    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        let next_id = subscriptions.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let map: BTreeMap<i64, Subscription> =
            subscriptions.into_iter().map(|s| (s.id, s)).collect();
        Self {
            subscriptions: Mutex::new(map),
            next_id: AtomicI64::new(next_id),
            queries: AtomicUsize::new(0),
        }
    }

    /// Get all subscriptions (for test assertions).
    pub fn get_all(&self) -> Vec<Subscription> {
        self.subscriptions.lock().unwrap().values().cloned().collect()
    }

    /// Number of list/sum queries that reached the repo.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn create(&self, subscription: &NewSubscription) -> AppResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscriptions
            .lock()
            .unwrap()
            .insert(id, subscription.clone().with_id(id));
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound("subscription"))
    }

    async fn get_by_filters(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn update(&self, subscription: &Subscription) -> AppResult<()> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let stored = subscriptions
            .get_mut(&subscription.id)
            .ok_or(AppError::NotFound("subscription"))?;
        *stored = subscription.clone();
        Ok(())
    }

    async fn patch(&self, id: i64, patch: &SubscriptionPatch) -> AppResult<Subscription> {
        // Holding the lock across read and write mirrors the row lock.
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let stored = subscriptions
            .get_mut(&id)
            .ok_or(AppError::NotFound("subscription"))?;
        patch.apply_to(stored)?;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.subscriptions
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound("subscription"))
    }

    async fn get_sum(&self, filter: &SubscriptionFilter) -> AppResult<f64> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| filter.matches(s))
            .fold(0.0, |acc, s| acc + s.price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_subscription, test_month};
    use uuid::Uuid;

    fn new_subscription() -> NewSubscription {
        NewSubscription {
            service_name: "Spotify".into(),
            user_id: Uuid::new_v4(),
            price: 4.99,
            start_date: test_month(),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemorySubscriptionRepo::new();

        let first = repo.create(&new_subscription()).await.unwrap();
        let second = repo.create(&new_subscription()).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(repo.get_all().len(), 2);
    }

    #[tokio::test]
    async fn test_seeded_ids_are_not_reused() {
        let repo = InMemorySubscriptionRepo::with_subscriptions(vec![create_test_subscription(
            |s| s.id = 10,
        )]);

        let id = repo.create(&new_subscription()).await.unwrap();
        assert_eq!(id, 11);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let repo = InMemorySubscriptionRepo::new();
        let result = repo.update(&create_test_subscription(|s| s.id = 99)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_overwrites_whole_record() {
        let original = create_test_subscription(|s| s.id = 2);
        let repo = InMemorySubscriptionRepo::with_subscriptions(vec![original.clone()]);

        let mut replacement = original.clone();
        replacement.service_name = "Apple TV".into();
        replacement.price = 6.99;
        repo.update(&replacement).await.unwrap();

        assert_eq!(repo.get_by_id(2).await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_sum_over_empty_repo_is_zero() {
        let repo = InMemorySubscriptionRepo::new();
        let sum = repo.get_sum(&SubscriptionFilter::default()).await.unwrap();
        assert_eq!(sum, 0.0);
        assert!(sum.is_sign_positive());
        assert_eq!(repo.query_count(), 1);
    }
}
