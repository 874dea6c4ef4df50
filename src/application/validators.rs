use uuid::Uuid;
use validator::Validate;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{CreateSubscriptionInput, UpdateSubscriptionInput},
    domain::entities::{month::Month, subscription_filter::SubscriptionFilter},
};

/// How strict list/sum filters are about their date bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Any well-formed, ordered range is accepted.
    #[default]
    Lenient,
    /// Additionally rejects `from`/`till` later than the current month.
    RejectFutureDates,
}

/// Parses a `MM-YYYY` request field, naming the field in the error.
pub fn parse_month(field: &str, raw: &str) -> AppResult<Month> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput(format!("invalid {field} format (expected MM-YYYY)")))
}

/// Validation rules for subscription requests and filters.
///
/// Built once at startup and handed to the use cases, so tests can pin the
/// policy and the clock.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionValidator {
    policy: FilterPolicy,
    pinned_month: Option<Month>,
}

impl SubscriptionValidator {
    pub fn new(policy: FilterPolicy) -> Self {
        Self {
            policy,
            pinned_month: None,
        }
    }

    /// Fixes "now" for the future-date check.
    pub fn with_current_month(mut self, month: Month) -> Self {
        self.pinned_month = Some(month);
        self
    }

    fn current_month(&self) -> Month {
        self.pinned_month.unwrap_or_else(Month::current)
    }

    pub fn validate_create(&self, input: &CreateSubscriptionInput) -> AppResult<()> {
        input.validate()?;

        if input.user_id.is_nil() {
            return Err(AppError::invalid("user_id cannot be nil"));
        }

        if input.start_date.is_empty() {
            return Err(AppError::invalid("start_date is required"));
        }
        let start = parse_month("start_date", &input.start_date)?;

        if let Some(raw_end) = &input.end_date {
            let end = parse_month("end_date", raw_end)?;
            if end < start {
                return Err(AppError::invalid("end_date must not be before start_date"));
            }
        }

        Ok(())
    }

    pub fn validate_update(&self, input: &UpdateSubscriptionInput) -> AppResult<()> {
        input.validate()?;

        if input.user_id.is_some_and(|id| id == Uuid::nil()) {
            return Err(AppError::invalid("user_id cannot be nil"));
        }

        if let (Some(raw_start), Some(raw_end)) = (&input.start_date, &input.end_date) {
            let start = parse_month("start_date", raw_start)?;
            let end = parse_month("end_date", raw_end)?;
            if end < start {
                return Err(AppError::invalid("end_date must not be before start_date"));
            }
        }

        Ok(())
    }

    pub fn validate_filter(&self, filter: &SubscriptionFilter) -> AppResult<()> {
        if let (Some(from), Some(till)) = (filter.from, filter.till) {
            if from > till {
                return Err(AppError::invalid(
                    "from must be before or equal to till",
                ));
            }
        }

        if self.policy == FilterPolicy::RejectFutureDates {
            let now = self.current_month();
            if filter.from.is_some_and(|from| from > now) {
                return Err(AppError::invalid("from cannot be in the future"));
            }
            if filter.till.is_some_and(|till| till > now) {
                return Err(AppError::invalid("till cannot be in the future"));
            }
        }

        Ok(())
    }
}
