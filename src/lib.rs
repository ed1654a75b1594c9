pub mod cli;
pub mod core;
pub mod providers;
pub mod surface;
pub mod widget;

use crate::core::config::AppConfig;
use crate::core::{ConversionQuery, CurrencyCode, RateProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: Option<CurrencyCode>,
        to: Option<CurrencyCode>,
    },
    Rates {
        base: Option<CurrencyCode>,
    },
    Interactive,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("cambio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.provider.base_url,
        defaults = ?config.defaults,
        language = ?config.language,
        "Loaded config"
    );

    let provider: Arc<dyn RateProvider> = Arc::new(
        providers::exchange_rate_api::ExchangeRateApiProvider::new(&config.provider)?,
    );
    let defaults = config.defaults.clone();

    match command {
        AppCommand::Convert { amount, from, to } => {
            let query = ConversionQuery::new(
                from.unwrap_or(defaults.source),
                to.unwrap_or(defaults.target),
            );
            cli::convert::run(provider.as_ref(), query, &amount, config.language).await
        }
        AppCommand::Rates { base } => {
            let base = base.unwrap_or(defaults.source);
            cli::rates::run(provider.as_ref(), &base, config.language).await
        }
        AppCommand::Interactive => {
            let query = ConversionQuery::new(defaults.source, defaults.target);
            cli::interactive::run(provider, query, config.language).await
        }
    }
}
