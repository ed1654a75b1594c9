use super::{NoticeBoard, NoticeId, Surface};
use crate::core::currency::CurrencyCode;
use crate::core::error::ErrorNotice;

/// Surface that keeps everything in fields, for tests and headless use.
#[derive(Debug, Default)]
pub struct MemorySurface {
    pub options: Vec<CurrencyCode>,
    pub source: Option<CurrencyCode>,
    pub target: Option<CurrencyCode>,
    pub converted_value: Option<String>,
    pub unit_rate: Option<String>,
    pub notices: NoticeBoard,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice_messages(&self) -> Vec<String> {
        self.notices
            .iter()
            .map(|(_, notice)| notice.message.clone())
            .collect()
    }
}

impl Surface for MemorySurface {
    fn populate_currencies(
        &mut self,
        options: &[CurrencyCode],
        source: &CurrencyCode,
        target: &CurrencyCode,
    ) {
        self.options = options.to_vec();
        self.source = Some(source.clone());
        self.target = Some(target.clone());
    }

    fn select_source(&mut self, code: &CurrencyCode) {
        self.source = Some(code.clone());
    }

    fn select_target(&mut self, code: &CurrencyCode) {
        self.target = Some(code.clone());
    }

    fn show_converted_value(&mut self, text: &str) {
        self.converted_value = Some(text.to_string());
    }

    fn show_unit_rate(&mut self, text: &str) {
        self.unit_rate = Some(text.to_string());
    }

    fn push_notice(&mut self, notice: ErrorNotice) -> NoticeId {
        self.notices.push(notice)
    }

    fn dismiss_notice(&mut self, id: NoticeId) -> bool {
        self.notices.dismiss(id)
    }
}
