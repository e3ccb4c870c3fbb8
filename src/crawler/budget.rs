//! Page budget with compare-and-swap slot reservation
//!
//! A [`PageBudget`] hands out at most `limit` slots. A slot is returned to the
//! budget when its [`BudgetSlot`] is dropped, unless it was committed first.
//! Workers reserve a slot before each fetch and commit it only when the page is
//! crawled successfully, which keeps `pages crawled <= limit` exact no matter
//! how many workers race for the last pages.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

#[derive(Debug)]
pub struct PageBudget {
    limit: u64,
    used: AtomicU64,
    released: Notify,
}

impl PageBudget {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            used: AtomicU64::new(0),
            released: Notify::new(),
        }
    }

    /// Takes one slot if any are left
    pub fn try_reserve(self: &Arc<Self>) -> Option<BudgetSlot> {
        let mut current = self.used.load(Ordering::Acquire);
        loop {
            if current >= self.limit {
                return None;
            }
            match self.used.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(BudgetSlot {
                        budget: Arc::clone(self),
                        committed: false,
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Resolves the next time an uncommitted slot is handed back
    pub fn released(&self) -> Notified<'_> {
        self.released.notified()
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Slots reserved or committed
    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn release(&self) {
        self.used.fetch_sub(1, Ordering::AcqRel);
        self.released.notify_waiters();
    }
}

/// One reserved unit of a [`PageBudget`]
#[derive(Debug)]
pub struct BudgetSlot {
    budget: Arc<PageBudget>,
    committed: bool,
}

impl BudgetSlot {
    /// Keeps the slot consumed for the rest of the run
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for BudgetSlot {
    fn drop(&mut self) {
        if !self.committed {
            self.budget.release();
        }
    }
}
