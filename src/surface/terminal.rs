use super::memory::MemorySurface;
use super::{NoticeId, Surface};
use crate::cli::ui;
use crate::core::currency::CurrencyCode;
use crate::core::error::ErrorNotice;
use comfy_table::Cell;

/// Surface that renders the widget state as a terminal table.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    state: MemorySurface,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &[CurrencyCode] {
        &self.state.options
    }

    pub fn notice_messages(&self) -> Vec<String> {
        self.state.notice_messages()
    }

    pub fn has_notices(&self) -> bool {
        !self.state.notices.is_empty()
    }

    pub fn render(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("From"),
            ui::header_cell("To"),
            ui::header_cell("Converted"),
            ui::header_cell("Rate"),
        ]);

        let code_cell = |code: &Option<CurrencyCode>| {
            Cell::new(code.as_ref().map_or("-".to_string(), |c| c.to_string()))
        };
        table.add_row(vec![
            code_cell(&self.state.source),
            code_cell(&self.state.target),
            ui::value_cell(self.state.converted_value.as_deref()),
            ui::value_cell(self.state.unit_rate.as_deref()),
        ]);

        let mut output = table.to_string();
        for (id, notice) in self.state.notices.iter() {
            output.push_str(&format!(
                "\n{} {}",
                ui::style_text(&format!("[{}]", id.0), ui::StyleType::Subtle),
                ui::style_text(&notice.message, ui::StyleType::Error)
            ));
        }
        output
    }
}

impl Surface for TerminalSurface {
    fn populate_currencies(
        &mut self,
        options: &[CurrencyCode],
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) {
        self.state.populate_currencies(options, source, target);
    }

    fn select_source(&mut self, code: &CurrencyCode) {
        self.state.select_source(code);
    }

    fn select_target(&mut self, code: &CurrencyCode) {
        self.state.select_target(code);
    }

    fn show_converted_value(&mut self, text: &str) {
        self.state.show_converted_value(text);
    }

    fn show_unit_rate(&mut self, text: &str) {
        self.state.show_unit_rate(text);
    }

    fn push_notice(&mut self, notice: ErrorNotice) -> NoticeId {
        self.state.push_notice(notice)
    }

    fn dismiss_notice(&mut self, id: NoticeId) -> bool {
        self.state.dismiss_notice(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_values_and_notices() {
        let mut surface = TerminalSurface::new();
        let usd = CurrencyCode::usd();
        let brl = CurrencyCode::brl();
        surface.populate_currencies(&[brl.clone(), usd.clone()], &usd, &brl);
        surface.show_converted_value("5.06");
        surface.show_unit_rate("1 USD = 5.0615 BRL");
        let id = surface.push_notice(ErrorNotice::new("Moeda não suportada"));

        let rendered = console::strip_ansi_codes(&surface.render()).to_string();
        assert!(rendered.contains("USD"));
        assert!(rendered.contains("5.06"));
        assert!(rendered.contains("1 USD = 5.0615 BRL"));
        assert!(rendered.contains("[1] Moeda não suportada"));

        assert!(surface.dismiss_notice(id));
        let rendered = console::strip_ansi_codes(&surface.render()).to_string();
        assert!(!rendered.contains("Moeda não suportada"));
    }

    #[test]
    fn test_render_empty_surface() {
        let surface = TerminalSurface::new();
        let rendered = console::strip_ansi_codes(&surface.render()).to_string();
        assert!(rendered.contains("N/A"));
        assert!(!surface.has_notices());
    }
}
