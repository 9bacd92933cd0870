use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
struct Pending {
    since: Instant,
    dropped: u64,
}

/// Lets one warning per key through every `window`, counting the rest.
///
/// Owned by the component that logs, so two clients never share windows.
/// Keys whose window has lapsed with nothing dropped are forgotten on the
/// next new key.
#[derive(Debug)]
pub struct LogThrottle {
    window: Duration,
    pending: Mutex<HashMap<String, Pending>>,
}

impl LogThrottle {
    pub fn new(window: Duration) -> Self {
        LogThrottle {
            window,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Records one occurrence for `key`.
    ///
    /// `Some(dropped)` means log it, mentioning the `dropped` occurrences
    /// swallowed since the last admitted one. `None` means stay quiet.
    pub fn admit(&self, key: &str) -> Option<u64> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if let Some(entry) = pending.get_mut(key) {
            if now.duration_since(entry.since) < self.window {
                entry.dropped += 1;
                return None;
            }
            let dropped = entry.dropped;
            *entry = Pending { since: now, dropped: 0 };
            return Some(dropped);
        }

        let window = self.window;
        pending.retain(|_, p| p.dropped > 0 || now.duration_since(p.since) < window);
        pending.insert(key.to_string(), Pending { since: now, dropped: 0 });
        Some(0)
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
