//! Output side of the widget: selectors, result text and notices.

pub mod memory;
pub mod terminal;

use crate::core::currency::CurrencyCode;
use crate::core::error::ErrorNotice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(pub u64);

/// Everything the widget writes to. Implementations only store and show;
/// they never compute.
pub trait Surface {
    /// Replaces both selectors' options and selects `source` and `target`.
    fn populate_currencies(
        &mut self,
        options: &[CurrencyCode],
        source: &CurrencyCode,
        target: &CurrencyCode,
    );
    fn select_source(&mut self, code: &CurrencyCode);
    fn select_target(&mut self, code: &CurrencyCode);
    fn show_converted_value(&mut self, text: &str);
    fn show_unit_rate(&mut self, text: &str);
    fn push_notice(&mut self, notice: ErrorNotice) -> NoticeId;
    /// Returns false if no notice with `id` is shown.
    fn dismiss_notice(&mut self, id: NoticeId) -> bool;
}

/// Append-only notice list with per-entry dismissal.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<(NoticeId, ErrorNotice)>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn push(&mut self, notice: ErrorNotice) -> NoticeId {
        self.next_id += 1;
        let id = NoticeId(self.next_id);
        self.notices.push((id, notice));
        id
    }

    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.notices.len();
        self.notices.retain(|(existing, _)| *existing != id);
        self.notices.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NoticeId, ErrorNotice)> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
