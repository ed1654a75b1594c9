//! Turns a rate table and a query into text on a [`Surface`].

use crate::core::currency::{ConversionQuery, ConversionResult, CurrencyCode, RateTable};
use crate::surface::Surface;
use tracing::warn;

pub fn format_converted_value(value: f64) -> String {
    format!("{value:.2}")
}

/// `1 USD = 5.0615 BRL`, with the rate at full precision.
pub fn format_unit_rate(source: &CurrencyCode, unit_rate: f64, target: &CurrencyCode) -> String {
    format!("1 {source} = {unit_rate} {target}")
}

/// Fills both selectors from the table and renders the query.
pub fn render_initial<S: Surface + ?Sized>(
    table: &RateTable,
    query: &ConversionQuery,
    surface: &mut S,
) -> Option<ConversionResult> {
    let options: Vec<CurrencyCode> = table.currencies().cloned().collect();
    surface.populate_currencies(&options, &query.source, &query.target);
    render_update(table, query, surface)
}

/// Recomputes and writes the converted value and the unit rate.
///
/// The caller must ensure `query.target` is in `table`; otherwise nothing is
/// written and `None` is returned.
pub fn render_update<S: Surface + ?Sized>(
    table: &RateTable,
    query: &ConversionQuery,
    surface: &mut S,
) -> Option<ConversionResult> {
    let Some(result) = ConversionResult::compute(table, query) else {
        warn!(
            target_currency = %query.target,
            base = %table.base(),
            "Selected currency missing from rate table, skipping render"
        );
        return None;
    };

    surface.show_converted_value(&format_converted_value(result.converted_value));
    surface.show_unit_rate(&format_unit_rate(
        table.base(),
        result.unit_rate,
        &query.target,
    ));
    Some(result)
}
