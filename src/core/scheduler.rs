//! Background refresh of all displays
//!
//! Every tick each display is updated when its interval has elapsed. Displays
//! run in their own task so a failing or slow display never holds up the rest.

use std::sync::Arc;
use std::time::Duration;

use log::{error, trace};
use tokio::time::{Instant, MissedTickBehavior};

use super::display::Display;

/// Counts of one scheduler pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Displays that rendered
    pub updated: usize,
    /// Displays that were still fresh
    pub skipped: usize,
    /// Displays whose update failed
    pub failed: usize,
}

/// Periodically calls `update_if_needed` on every display
pub struct RefreshScheduler {
    displays: Vec<Arc<Display>>,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(displays: Vec<Arc<Display>>, interval: Duration) -> Self {
        Self { displays, interval }
    }

    /// Run forever
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let start = Instant::now();
            let report = self.tick().await;
            trace!(
                "Refresh cycle took {:?}: {} updated, {} skipped, {} failed",
                start.elapsed(),
                report.updated,
                report.skipped,
                report.failed
            );
        }
    }

    /// One pass over all displays
    pub async fn tick(&self) -> TickReport {
        let tasks: Vec<_> = self
            .displays
            .iter()
            .map(|display| {
                let display_id = display.id().to_string();
                let display = display.clone();
                let task = tokio::spawn(async move { display.update_if_needed().await });
                (display_id, task)
            })
            .collect();

        let mut report = TickReport::default();
        for (display_id, task) in tasks {
            match task.await {
                Ok(Ok(Some(_))) => report.updated += 1,
                Ok(Ok(None)) => report.skipped += 1,
                Ok(Err(e)) => {
                    error!("Error updating display {}: {:#}", display_id, e);
                    report.failed += 1;
                }
                Err(e) => {
                    error!("Update task for display {} panicked: {}", display_id, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
