use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::validators::parse_month,
    domain::entities::subscription_filter::SubscriptionFilter,
};

/// Builds a filter from raw query parameters.
///
/// Recognised keys: `user_id`, `service_name` (or `name`), `from`, `till`
/// (or `to`). Absent or empty values leave that constraint off. Range checks
/// are left to the validator.
pub fn filter_from_query(params: &HashMap<String, String>) -> AppResult<SubscriptionFilter> {
    let get = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());

    let user_id = get("user_id")
        .map(|raw| Uuid::parse_str(raw).map_err(|_| AppError::invalid("invalid user_id")))
        .transpose()?;

    let service_name = get("service_name").or_else(|| get("name")).map(str::to_string);

    let from = get("from").map(|raw| parse_month("from", raw)).transpose()?;

    let till = get("till")
        .or_else(|| get("to"))
        .map(|raw| parse_month("till", raw))
        .transpose()?;

    Ok(SubscriptionFilter {
        user_id,
        service_name,
        from,
        till,
    })
}
