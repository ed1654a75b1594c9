//! The converter state machine.
//!
//! A [`Widget`] owns the rate store, the current query and the surface it
//! renders into. User events are applied synchronously through
//! [`Widget::handle`]. Events that need fresh rates return a
//! [`FetchRequest`]; the caller runs it (inline or on a spawned task) and
//! hands the resulting [`FetchCompletion`] back to [`Widget::complete`].
//! Only the most recently issued fetch may replace the rate table.

use crate::core::currency::{
    ConversionQuery, CurrencyCode, RatePayload, RateTable, parse_multiplier,
};
use crate::core::error::{ErrorNotice, FetchError, Language};
use crate::core::presenter;
use crate::core::rates::RateProvider;
use crate::core::store::{Commit, FetchTicket, RateStore};
use crate::surface::{NoticeId, Surface};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    Load,
    SourceChanged(CurrencyCode),
    TargetChanged(CurrencyCode),
    /// Raw text from the amount input.
    MultiplierChanged(String),
    DismissNotice(NoticeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub base: CurrencyCode,
}

impl FetchRequest {
    pub fn complete(self, outcome: Result<RatePayload, FetchError>) -> FetchCompletion {
        FetchCompletion {
            ticket: self.ticket,
            base: self.base,
            outcome,
        }
    }

    pub async fn run<P: RateProvider + ?Sized>(self, provider: &P) -> FetchCompletion {
        let outcome = provider.latest(&self.base).await;
        self.complete(outcome)
    }
}

#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub base: CurrencyCode,
    pub outcome: Result<RatePayload, FetchError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionStatus {
    /// The table was stored and rendered.
    Applied,
    /// A notice was raised; nothing changed.
    Rejected(FetchError),
    /// A newer fetch was issued meanwhile; the result was dropped.
    Stale,
}

pub struct Widget<S: Surface> {
    store: RateStore,
    query: ConversionQuery,
    surface: S,
    language: Language,
}

impl<S: Surface> Widget<S> {
    pub fn new(surface: S, query: ConversionQuery, language: Language) -> Self {
        Self {
            store: RateStore::new(),
            query,
            surface,
            language,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn query(&self) -> &ConversionQuery {
        &self.query
    }

    pub fn table(&self) -> Option<&RateTable> {
        self.store.get()
    }

    /// Applies a user event. Returns a request when new rates are needed.
    pub fn handle(&mut self, event: WidgetEvent) -> Option<FetchRequest> {
        debug!(?event, "Handling widget event");
        match event {
            WidgetEvent::Load => Some(self.start_fetch()),
            WidgetEvent::SourceChanged(code) => {
                self.query.source = code;
                Some(self.start_fetch())
            }
            WidgetEvent::TargetChanged(code) => {
                self.change_target(code);
                None
            }
            WidgetEvent::MultiplierChanged(text) => {
                self.query.multiplier = parse_multiplier(&text);
                if let Some(table) = self.store.get() {
                    presenter::render_update(table, &self.query, &mut self.surface);
                }
                None
            }
            WidgetEvent::DismissNotice(id) => {
                if !self.surface.dismiss_notice(id) {
                    debug!(?id, "No notice to dismiss");
                }
                None
            }
        }
    }

    /// Applies the outcome of a fetch started by [`Widget::handle`].
    pub fn complete(&mut self, completion: FetchCompletion) -> CompletionStatus {
        let FetchCompletion {
            ticket,
            base,
            outcome,
        } = completion;

        let payload = match outcome {
            Ok(payload) => payload,
            Err(err) => {
                self.reject(ticket, &err);
                return CompletionStatus::Rejected(err);
            }
        };

        match self.store.commit(ticket, &base, payload, &self.query.target) {
            Err(err) => {
                let err = FetchError::from(err);
                self.reject(ticket, &err);
                CompletionStatus::Rejected(err)
            }
            Ok(Commit::Stale) => CompletionStatus::Stale,
            Ok(Commit::Applied(table)) => {
                info!(base = %table.base(), currencies = table.len(), "Rate table updated");
                self.query.source = table.base().clone();
                // Options follow the new table so every listed target has a rate
                presenter::render_initial(table, &self.query, &mut self.surface);
                CompletionStatus::Applied
            }
        }
    }

    /// Handles `event` and, if it needs rates, fetches them right away.
    pub async fn dispatch<P: RateProvider + ?Sized>(
        &mut self,
        event: WidgetEvent,
        provider: &P,
    ) -> Option<CompletionStatus> {
        let request = self.handle(event)?;
        let completion = request.run(provider).await;
        Some(self.complete(completion))
    }

    fn start_fetch(&mut self) -> FetchRequest {
        FetchRequest {
            ticket: self.store.begin_fetch(),
            base: self.query.source.clone(),
        }
    }

    fn change_target(&mut self, code: CurrencyCode) {
        let Some(table) = self.store.get() else {
            self.query.target = code;
            return;
        };

        if let Err(err) = table.ensure_contains(&code) {
            // Keep the previous target selected
            self.surface.select_target(&self.query.target);
            let notice = ErrorNotice::from_error(&FetchError::from(err), self.language);
            self.surface.push_notice(notice);
            return;
        }

        self.query.target = code;
        self.surface.select_target(&self.query.target);
        presenter::render_update(table, &self.query, &mut self.surface);
    }

    fn reject(&mut self, ticket: FetchTicket, err: &FetchError) {
        warn!(error = %err, sequence = ticket.sequence(), "Rate fetch failed");
        self.surface
            .push_notice(ErrorNotice::from_error(err, self.language));

        // A newer fetch may still succeed, leave its selection alone
        if !self.store.is_current(ticket) {
            return;
        }
        if let Some(table) = self.store.get() {
            self.query.source = table.base().clone();
            self.surface.select_source(&self.query.source);
        }
    }
}
