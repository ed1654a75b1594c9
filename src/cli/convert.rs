use super::ui;
use crate::core::currency::ConversionQuery;
use crate::core::error::Language;
use crate::core::rates::RateProvider;
use crate::surface::terminal::TerminalSurface;
use crate::widget::{CompletionStatus, Widget, WidgetEvent};
use anyhow::{Result, bail};
use tracing::info;

/// Loads rates for `query.source` and converts `amount` once.
pub async fn convert(
    provider: &dyn RateProvider,
    query: ConversionQuery,
    amount: &str,
    language: Language,
) -> Result<TerminalSurface> {
    info!(from = %query.source, to = %query.target, amount, "Converting");
    let mut widget = Widget::new(TerminalSurface::new(), query, language);

    let pb = ui::new_spinner(&format!("Fetching {} rates", widget.query().source));
    let status = widget.dispatch(WidgetEvent::Load, provider).await;
    pb.finish_and_clear();

    if let Some(CompletionStatus::Rejected(err)) = status {
        bail!(err.user_message(language));
    }

    widget.handle(WidgetEvent::MultiplierChanged(amount.to_string()));
    Ok(widget.into_surface())
}

pub async fn run(
    provider: &dyn RateProvider,
    query: ConversionQuery,
    amount: &str,
    language: Language,
) -> Result<()> {
    let surface = convert(provider, query, amount, language).await?;
    println!("{}", surface.render());
    Ok(())
}
