use uuid::Uuid;

use crate::domain::entities::{month::Month, subscription::Subscription};

/// Narrows which subscriptions a list or sum considers.
///
/// `None` means "no constraint". The `till` bound applies to the start month,
/// not the end month: a subscription is in range when it started in
/// `[from, till]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub from: Option<Month>,
    pub till: Option<Month>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    UserId,
    ServiceName,
    StartDate,
}

impl FilterColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterColumn::UserId => "user_id",
            FilterColumn::ServiceName => "service_name",
            FilterColumn::StartDate => "start_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    GtOrEq,
    LtOrEq,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::GtOrEq => ">=",
            CompareOp::LtOrEq => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Uuid(Uuid),
    Text(String),
    Month(Month),
}

/// One `column op value` condition. A filter is the conjunction of its clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub column: FilterColumn,
    pub op: CompareOp,
    pub value: FilterValue,
}

impl SubscriptionFilter {
    /// Lowers the filter to the clause list shared by every read path.
    pub fn clauses(&self) -> Vec<FilterClause> {
        let mut clauses = Vec::with_capacity(4);

        if let Some(user_id) = self.user_id {
            clauses.push(FilterClause {
                column: FilterColumn::UserId,
                op: CompareOp::Eq,
                value: FilterValue::Uuid(user_id),
            });
        }
        if let Some(name) = &self.service_name {
            clauses.push(FilterClause {
                column: FilterColumn::ServiceName,
                op: CompareOp::Eq,
                value: FilterValue::Text(name.clone()),
            });
        }
        if let Some(from) = self.from {
            clauses.push(FilterClause {
                column: FilterColumn::StartDate,
                op: CompareOp::GtOrEq,
                value: FilterValue::Month(from),
            });
        }
        if let Some(till) = self.till {
            clauses.push(FilterClause {
                column: FilterColumn::StartDate,
                op: CompareOp::LtOrEq,
                value: FilterValue::Month(till),
            });
        }

        clauses
    }

    pub fn matches(&self, subscription: &Subscription) -> bool {
        self.clauses().iter().all(|c| c.matches(subscription))
    }
}

impl FilterClause {
    pub fn matches(&self, subscription: &Subscription) -> bool {
        match (&self.column, &self.value) {
            (FilterColumn::UserId, FilterValue::Uuid(id)) => {
                self.op.holds(subscription.user_id.cmp(id))
            }
            (FilterColumn::ServiceName, FilterValue::Text(name)) => {
                self.op.holds(subscription.service_name.as_str().cmp(name.as_str()))
            }
            (FilterColumn::StartDate, FilterValue::Month(month)) => {
                self.op.holds(subscription.start_date.cmp(month))
            }
            // Mistyped clauses never match.
            _ => false,
        }
    }
}

impl CompareOp {
    fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::GtOrEq => ordering.is_ge(),
            CompareOp::LtOrEq => ordering.is_le(),
        }
    }
}
