use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual flavour of a toast notification.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
        };
        f.write_str(name)
    }
}

/// A single user-facing notification. `id` is a millisecond timestamp, unique per store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
}
