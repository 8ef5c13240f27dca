// ── Runtime console configuration ──
//
// Tuning knobs for the reconciliation engine. The CLI builds one of
// these from file/env config and hands it in -- core never reads disk.

use std::time::Duration;

use crate::model::ScheduleShape;

/// Configuration for a console session.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Device list page size. A full page implies more data may exist;
    /// a short page is terminal.
    pub page_size: usize,

    /// Quiet period before a search keystroke triggers a fetch.
    pub debounce: Duration,

    /// Which schedule shape this deployment uses; governs schedule-edit
    /// validation.
    pub schedule_shape: ScheduleShape,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            debounce: Duration::from_millis(400),
            schedule_shape: ScheduleShape::Window,
        }
    }
}
