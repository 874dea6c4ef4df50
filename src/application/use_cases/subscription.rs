use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::{SubscriptionValidator, parse_month},
    domain::entities::{
        month::Month,
        subscription::{NewSubscription, Subscription},
        subscription_filter::SubscriptionFilter,
    },
};

// ============================================================================
// Inputs
// ============================================================================

/// Body of a create request. Missing fields fall back to zero values so they
/// surface as validation errors rather than body-shape errors.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateSubscriptionInput {
    #[validate(length(min = 1, message = "service_name is required"))]
    pub service_name: String,
    pub user_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    pub price: f64,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl CreateSubscriptionInput {
    /// Converts to a storable record. Parses dates independently of any prior
    /// validation.
    pub fn to_model(&self) -> AppResult<NewSubscription> {
        let start_date = parse_month("start_date", &self.start_date)?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|raw| parse_month("end_date", raw))
            .transpose()?;

        Ok(NewSubscription {
            service_name: self.service_name.clone(),
            user_id: self.user_id,
            price: self.price,
            start_date,
            end_date,
        })
    }
}

/// Body of a partial update. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSubscriptionInput {
    #[validate(length(min = 1, message = "service_name cannot be empty"))]
    pub service_name: Option<String>,
    pub user_id: Option<Uuid>,
    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    pub price: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl UpdateSubscriptionInput {
    /// Parses every present field up front. Nothing is mutated here, so a bad
    /// field can never leave a record half-patched.
    pub fn stage(&self) -> AppResult<SubscriptionPatch> {
        let start_date = self
            .start_date
            .as_deref()
            .map(|raw| parse_month("start_date", raw))
            .transpose()?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|raw| parse_month("end_date", raw))
            .transpose()?;

        Ok(SubscriptionPatch {
            service_name: self.service_name.clone(),
            user_id: self.user_id,
            price: self.price,
            start_date,
            end_date,
        })
    }

    /// Stages and applies in one step; on error `subscription` is unchanged.
    pub fn patch_model(&self, subscription: &mut Subscription) -> AppResult<()> {
        self.stage()?.apply_to(subscription)
    }
}

/// Fully parsed field overrides for an existing subscription.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionPatch {
    pub service_name: Option<String>,
    pub user_id: Option<Uuid>,
    pub price: Option<f64>,
    pub start_date: Option<Month>,
    pub end_date: Option<Month>,
}

impl SubscriptionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges into `subscription`. The merged record must still have a valid
    /// period, otherwise nothing is written.
    pub fn apply_to(&self, subscription: &mut Subscription) -> AppResult<()> {
        let mut merged = subscription.clone();

        if let Some(name) = &self.service_name {
            merged.service_name = name.clone();
        }
        if let Some(user_id) = self.user_id {
            merged.user_id = user_id;
        }
        if let Some(price) = self.price {
            merged.price = price;
        }
        if let Some(start) = self.start_date {
            merged.start_date = start;
        }
        if let Some(end) = self.end_date {
            merged.end_date = Some(end);
        }

        if !merged.has_valid_period() {
            return Err(AppError::invalid("end_date must not be before start_date"));
        }

        *subscription = merged;
        Ok(())
    }
}

// ============================================================================
// Repository port
// ============================================================================

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Inserts and returns the id assigned by storage.
    async fn create(&self, subscription: &NewSubscription) -> AppResult<i64>;
    async fn get_by_id(&self, id: i64) -> AppResult<Subscription>;
    /// Matching rows in insertion order. No match is an empty list.
    async fn get_by_filters(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>>;
    /// Overwrites every column of the row with `subscription.id`.
    async fn update(&self, subscription: &Subscription) -> AppResult<()>;
    /// Locks the row, applies the patch and writes it back atomically.
    async fn patch(&self, id: i64, patch: &SubscriptionPatch) -> AppResult<Subscription>;
    async fn delete(&self, id: i64) -> AppResult<()>;
    /// Sum of prices over matching rows, 0 when nothing matches.
    async fn get_sum(&self, filter: &SubscriptionFilter) -> AppResult<f64>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct SubscriptionUseCases {
    repo: Arc<dyn SubscriptionRepo>,
    validator: Arc<SubscriptionValidator>,
}

impl SubscriptionUseCases {
    pub fn new(repo: Arc<dyn SubscriptionRepo>, validator: Arc<SubscriptionValidator>) -> Self {
        Self { repo, validator }
    }

    #[instrument(skip(self, input), fields(service_name = %input.service_name, user_id = %input.user_id))]
    pub async fn create(&self, input: &CreateSubscriptionInput) -> AppResult<Subscription> {
        self.validator.validate_create(input)?;
        let new = input.to_model()?;

        let id = self.repo.create(&new).await?;
        tracing::info!(subscription_id = id, "Subscription created");

        Ok(new.with_id(id))
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> AppResult<Subscription> {
        self.repo.get_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_filters(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        self.validator.validate_filter(filter)?;
        self.repo.get_by_filters(filter).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: &UpdateSubscriptionInput) -> AppResult<Subscription> {
        self.validator.validate_update(input)?;
        let patch = input.stage()?;

        let updated = self.repo.patch(id, &patch).await?;
        tracing::info!(subscription_id = id, "Subscription updated");

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repo.delete(id).await?;
        tracing::info!(subscription_id = id, "Subscription deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_sum(&self, filter: &SubscriptionFilter) -> AppResult<f64> {
        self.validator.validate_filter(filter)?;
        self.repo.get_sum(filter).await
    }
}
