//! Fan-out loading of table batches and stale-result rejection.
//!
//! A chart needs every table of its batch before anything is built from them,
//! so [`load_batch`] is all-or-nothing. [`ChartSlot`] tags each redraw with a
//! generation so that a slow, superseded batch cannot overwrite a newer one.

use crate::error::DataLoadError;
use crate::loader::{TableCache, TableSource};
use crate::models::IndicatorTable;
use log::debug;
use std::sync::Arc;

/// Fetch every locator concurrently and return one result per locator, in order.
pub fn load_each<S, L>(
    cache: &TableCache,
    source: &S,
    locators: &[L],
) -> Vec<Result<Arc<IndicatorTable>, DataLoadError>>
where
    S: TableSource + ?Sized,
    L: AsRef<str> + Sync,
{
    std::thread::scope(|scope| {
        let handles: Vec<_> = locators
            .iter()
            .map(|l| scope.spawn(move || cache.get_or_load(source, l.as_ref())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}

/// Fetch every locator concurrently; the first failure fails the whole batch.
pub fn load_batch<S, L>(
    cache: &TableCache,
    source: &S,
    locators: &[L],
) -> Result<Vec<Arc<IndicatorTable>>, DataLoadError>
where
    S: TableSource + ?Sized,
    L: AsRef<str> + Sync,
{
    load_each(cache, source, locators).into_iter().collect()
}

/// Proof that a redraw was started; only the latest one may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Displayed content of one chart plus its request generation counter.
#[derive(Debug, Clone)]
pub struct ChartSlot<T> {
    issued: u64,
    committed: u64,
    content: Option<T>,
}

impl<T> Default for ChartSlot<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            committed: 0,
            content: None,
        }
    }
}

impl<T> ChartSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a redraw. Every earlier ticket becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket {
            generation: self.issued,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.issued
    }

    /// Store `value` if `ticket` is the latest issued. Returns whether it was stored.
    pub fn commit(&mut self, ticket: Ticket, value: T) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "discarding stale chart result (generation {} < {})",
                ticket.generation, self.issued
            );
            return false;
        }
        self.committed = ticket.generation;
        self.content = Some(value);
        true
    }

    pub fn current(&self) -> Option<&T> {
        self.content.as_ref()
    }

    /// Generation of the content currently shown (0 before the first commit).
    pub fn committed_generation(&self) -> u64 {
        self.committed
    }

    /// True while a started redraw has not committed yet.
    pub fn is_pending(&self) -> bool {
        self.issued != self.committed
    }
}
