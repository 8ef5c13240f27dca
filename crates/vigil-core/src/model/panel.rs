// ── Panel singleton ──

use serde::{Deserialize, Serialize};

/// The session-wide arm flag, independent of any building.
///
/// Exactly one instance; fetched once at connect, toggled via explicit
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub armed: bool,
}
