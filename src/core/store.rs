//! Holder of the most recently committed rate table

use crate::core::currency::{CurrencyCode, RatePayload, RateTable};
use crate::core::error::ValidationError;
use tracing::debug;

/// Sequence token handed out when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, PartialEq)]
pub enum Commit<'a> {
    Applied(&'a RateTable),
    /// A newer fetch was issued after this one; the table was dropped.
    Stale,
}

/// Single-writer cell for the current rate table.
#[derive(Debug, Default)]
pub struct RateStore {
    table: Option<RateTable>,
    issued: u64,
}

impl RateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&RateTable> {
        self.table.as_ref()
    }

    /// Validates `candidate` and replaces the stored table, regardless of
    /// any fetch in flight.
    pub fn set(
        &mut self,
        requested: &CurrencyCode,
        candidate: RatePayload,
    ) -> Result<&RateTable, ValidationError> {
        let table = RateTable::from_payload(requested, candidate)?;
        Ok(&*self.table.insert(table))
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        debug!(sequence = self.issued, "Issued fetch ticket");
        FetchTicket(self.issued)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Validates `candidate` and stores it only if `ticket` belongs to the
    /// latest issued fetch.
    ///
    /// The table must also carry `required`, the currency currently selected
    /// as target. Validation runs for stale tickets too, so a bad payload is
    /// always reported.
    pub fn commit(
        &mut self,
        ticket: FetchTicket,
        requested: &CurrencyCode,
        candidate: RatePayload,
        required: &CurrencyCode,
    ) -> Result<Commit<'_>, ValidationError> {
        let table = RateTable::from_payload(requested, candidate)?;
        table.ensure_contains(required)?;

        if !self.is_current(ticket) {
            debug!(
                sequence = ticket.0,
                latest = self.issued,
                base = %table.base(),
                "Discarding stale rate table"
            );
            return Ok(Commit::Stale);
        }
        Ok(Commit::Applied(&*self.table.insert(table)))
    }
}
