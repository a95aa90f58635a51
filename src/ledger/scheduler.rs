//! Daily auto-close timer.
//!
//! Sleeps until the configured local cutoff, then closes every session of
//! the day that is still open. On startup it first closes every earlier day
//! left open while the process was down, and today if its cutoff has passed.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

use crate::ledger::service::LedgerService;
use crate::utils::time;

pub struct AutoCloseScheduler {
    ledger: Arc<LedgerService>,
    shutdown: CancellationToken,
}

impl AutoCloseScheduler {
    pub fn new(ledger: Arc<LedgerService>, shutdown: CancellationToken) -> Self {
        Self { ledger, shutdown }
    }

    pub async fn run(self) {
        tracing::info!(
            cutoff = %self.ledger.auto_close_at().format("%H:%M"),
            "Auto-close scheduler started"
        );

        self.catch_up().await;

        loop {
            let sleep_for = time::duration_until_next(
                self.ledger.auto_close_at(),
                self.ledger.timezone(),
                Utc::now(),
            );
            tracing::info!("Next auto-close in {} minutes", sleep_for.as_secs() / 60);

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {
                    self.close_day(self.ledger.today()).await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Auto-close scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    async fn catch_up(&self) {
        match self.ledger.close_missed_days().await {
            Ok(reports) => {
                for report in reports.iter().filter(|r| !r.closed.is_empty() || !r.skipped.is_empty()) {
                    tracing::warn!(
                        date = %report.date,
                        closed = report.closed.len(),
                        skipped = report.skipped.len(),
                        "Closed sessions missed while offline"
                    );
                }
            }
            Err(e) => {
                tracing::error!("Auto-close catch-up failed: {}", e);
            }
        }
    }

    async fn close_day(&self, date: NaiveDate) {
        match self.ledger.run_auto_close(date).await {
            Ok(report) if report.closed.is_empty() && report.skipped.is_empty() => {
                tracing::debug!(%date, "No open sessions to auto-close");
            }
            Ok(report) => {
                tracing::info!(
                    %date,
                    closed = report.closed.len(),
                    skipped = report.skipped.len(),
                    "Auto-close run complete"
                );
            }
            Err(e) => {
                tracing::error!(%date, "Auto-close run failed: {}", e);
            }
        }
    }
}
