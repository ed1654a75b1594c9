use super::ui;
use crate::core::currency::{CurrencyCode, RateTable};
use crate::core::error::{FetchError, Language};
use crate::core::rates::RateProvider;
use crate::core::store::RateStore;
use anyhow::{Result, anyhow};
use comfy_table::{Cell, CellAlignment};

pub async fn fetch_table(
    provider: &dyn RateProvider,
    base: &CurrencyCode,
    language: Language,
) -> Result<RateTable> {
    let pb = ui::new_spinner(&format!("Fetching {base} rates"));
    let payload = provider.latest(base).await;
    pb.finish_and_clear();

    let mut store = RateStore::new();
    let table = payload
        .and_then(|payload| store.set(base, payload).cloned().map_err(FetchError::from))
        .map_err(|e| anyhow!(e.user_message(language)))?;
    Ok(table)
}

pub fn display_rates(table: &RateTable) -> String {
    let mut output = format!(
        "Rates for {}\n\n",
        ui::style_text(&format!("1 {}", table.base()), ui::StyleType::Title)
    );

    let mut rows = ui::new_styled_table();
    rows.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Rate")]);
    for (code, rate) in table.iter() {
        rows.add_row(vec![
            Cell::new(code.to_string()),
            Cell::new(rate.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }
    output.push_str(&rows.to_string());

    if let Some(updated) = table.last_updated() {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("Last updated: {}", updated.format("%Y-%m-%d %H:%M UTC")),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}

pub async fn run(provider: &dyn RateProvider, base: &CurrencyCode, language: Language) -> Result<()> {
    let table = fetch_table(provider, base, language).await?;
    println!("{}", display_rates(&table));
    Ok(())
}
