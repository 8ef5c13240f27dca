// ── User-facing notices ──

/// A message for the presentation layer to surface (toast, status line).
///
/// Emitted for outcomes of background work the caller didn't directly
/// await, e.g. a debounced search that failed.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}
