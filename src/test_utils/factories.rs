//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use uuid::Uuid;

use crate::domain::entities::{month::Month, subscription::Subscription};

/// Create a test subscription with sensible defaults.
pub fn create_test_subscription(overrides: impl FnOnce(&mut Subscription)) -> Subscription {
    let mut subscription = Subscription {
        id: 1,
        service_name: "Netflix".to_string(),
        user_id: Uuid::new_v4(),
        price: 9.99,
        start_date: test_month(),
        end_date: None,
    };
    overrides(&mut subscription);
    subscription
}

/// January 2024, the default start month for fixtures.
pub fn test_month() -> Month {
    Month::new(2024, 1).expect("valid month")
}
