use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::month::Month;

/// A stored subscription row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    pub id: i64,
    pub service_name: String,
    pub user_id: Uuid,
    pub price: f64,
    pub start_date: Month,
    pub end_date: Option<Month>,
}

/// A subscription that has not been persisted yet, so it has no id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub service_name: String,
    pub user_id: Uuid,
    pub price: f64,
    pub start_date: Month,
    pub end_date: Option<Month>,
}

impl NewSubscription {
    pub fn with_id(self, id: i64) -> Subscription {
        Subscription {
            id,
            service_name: self.service_name,
            user_id: self.user_id,
            price: self.price,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

impl Subscription {
    /// True when the end month, if any, does not precede the start month.
    pub fn has_valid_period(&self) -> bool {
        self.end_date.is_none_or(|end| end >= self.start_date)
    }
}
