use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::{Toast, ToastKind};

/// How long a toast stays visible unless dismissed.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);

struct Inner {
    toasts: watch::Sender<Vec<Toast>>,
    last_id: AtomicI64,
}

/// Queue of visible toasts in insertion order.
///
/// Each `add` schedules its own removal; the timer is not cancelled by an
/// earlier dismissal and simply finds nothing to remove. Unbounded.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<Inner>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    pub fn new() -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        ToastStore {
            inner: Arc::new(Inner {
                toasts,
                last_id: AtomicI64::new(0),
            }),
        }
    }

    /// Millisecond timestamp, bumped past the previous id when two toasts
    /// land in the same millisecond.
    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .inner
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    /// Appends a toast and schedules its removal after `duration`.
    ///
    /// Outside a Tokio runtime the toast is still shown but stays until
    /// [`ToastStore::remove`] is called.
    pub fn add(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) -> i64 {
        let id = self.next_id();
        let message = message.into();
        debug!("Toast {} ({}): {}", id, kind, message);
        self.inner
            .toasts
            .send_modify(|toasts| toasts.push(Toast { id, message, kind }));

        match Handle::try_current() {
            Ok(runtime) => {
                let store = self.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(duration).await;
                    store.remove(id);
                });
            }
            Err(_) => warn!("No async runtime; toast {} will not expire on its own.", id),
        }
        id
    }

    /// A success toast with the default duration.
    pub fn add_default(&self, message: impl Into<String>) -> i64 {
        self.add(message, ToastKind::Success, DEFAULT_TOAST_DURATION)
    }

    /// Removes a toast immediately. Unknown ids are ignored.
    pub fn remove(&self, id: i64) {
        self.inner.toasts.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        });
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.inner.toasts.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.toasts.subscribe()
    }
}
