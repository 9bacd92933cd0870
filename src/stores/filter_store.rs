use std::sync::Arc;

use tokio::sync::watch;

use crate::models::OpportunityFilters;

/// Shared, directly mutable opportunities search state.
///
/// No transactional discipline: concurrent writers interleave and the last
/// write to a field wins.
#[derive(Clone)]
pub struct FilterStore {
    state: Arc<watch::Sender<OpportunityFilters>>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(OpportunityFilters::default());
        FilterStore {
            state: Arc::new(state),
        }
    }

    /// Mutates the state in place and notifies subscribers.
    pub fn update<F>(&self, mutate: F)
    where
        F: FnOnce(&mut OpportunityFilters),
    {
        self.state.send_modify(mutate);
    }

    /// Reads a value out of the current state without cloning all of it.
    pub fn read<T>(&self, f: impl FnOnce(&OpportunityFilters) -> T) -> T {
        f(&self.state.borrow())
    }

    pub fn snapshot(&self) -> OpportunityFilters {
        self.state.borrow().clone()
    }

    pub fn reset(&self) {
        self.state.send_replace(OpportunityFilters::default());
    }

    pub fn subscribe(&self) -> watch::Receiver<OpportunityFilters> {
        self.state.subscribe()
    }
}
