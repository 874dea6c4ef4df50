use crate::{
    adapters::http::app_state::AppState,
    application::validators::SubscriptionValidator,
    infra::{
        config::{AppConfig, LogFormat},
        error::InfraError,
        postgres_persistence,
    },
    use_cases::subscription::{SubscriptionRepo, SubscriptionUseCases},
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env()?;

    init_tracing(&config)?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        log_level = ?config.log_level,
        filter_policy = ?config.filter_policy,
        "Configuration loaded"
    );

    let postgres_arc = Arc::new(postgres_persistence(&config).await?);
    let validator = Arc::new(SubscriptionValidator::new(config.filter_policy));

    let subscription_use_cases = SubscriptionUseCases::new(
        postgres_arc as Arc<dyn SubscriptionRepo>,
        validator,
    );

    Ok(AppState {
        config: Arc::new(config),
        subscription_use_cases: Arc::new(subscription_use_cases),
    })
}

pub fn init_tracing(config: &AppConfig) -> Result<(), InfraError> {
    let level = config.log_level.as_directive();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("subtrack={level},tower_http={level}").into());

    // Console (pretty logs)
    let pretty_layer = (config.log_format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_target(false) // don't show target (module path)
            .with_level(true)
            .pretty()
    });

    // Console (structured JSON, for log collectors)
    let json_layer = (config.log_format == LogFormat::Json)
        .then(|| fmt::layer().json().with_current_span(true));

    // File (structured JSON logs)
    let file_layer = match &config.log_file {
        Some(path) => {
            let file = File::create(path).map_err(InfraError::LogFile)?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(true)
                    .with_span_list(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .ok();

    Ok(())
}
