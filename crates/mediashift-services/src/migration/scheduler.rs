use super::engine::MigrationEngine;
use mediashift_core::{AppError, BatchResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};

/// How often the background job starts a new pass over the catalog.
const PASS_INTERVAL: Duration = Duration::from_secs(3600);

/// Totals of one scheduler pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerRun {
    /// Batches that examined at least one item.
    pub batches: u32,
    pub migrated: u64,
    pub examined: u64,
    pub errors: Vec<String>,
}

impl SchedulerRun {
    fn absorb(&mut self, batch: BatchResult) {
        self.batches += 1;
        self.migrated += batch.migrated;
        self.examined += batch.total;
        self.errors.extend(batch.errors);
    }
}

/// Repeatedly invokes the batch operation, with a delay between batches, until a
/// batch examines zero items.
///
/// The scan cursor is carried from batch to batch, so items that were skipped or
/// failed are passed over for the rest of the pass instead of being selected again.
/// They are retried by the next pass.
#[derive(Clone)]
pub struct MigrationScheduler {
    engine: Arc<MigrationEngine>,
    batch_size: u32,
    delay: Duration,
}

impl MigrationScheduler {
    pub fn new(engine: Arc<MigrationEngine>, batch_size: u32, delay: Duration) -> Self {
        Self {
            engine,
            batch_size,
            delay,
        }
    }

    /// Run batches until convergence. A failed scan ends the pass with the error.
    #[tracing::instrument(skip(self), fields(batch_size = self.batch_size))]
    pub async fn run_until_converged(&self) -> Result<SchedulerRun, AppError> {
        let mut run = SchedulerRun::default();
        let mut cursor = None;

        loop {
            let batch = self
                .engine
                .migrate_batch_from(cursor, self.batch_size)
                .await?;

            if batch.is_converged() {
                break;
            }

            cursor = batch.next_cursor;
            run.absorb(batch);

            tracing::debug!(
                batches = run.batches,
                migrated = run.migrated,
                cursor = ?cursor,
                "Batch finished, waiting before next batch"
            );
            sleep(self.delay).await;
        }

        tracing::info!(
            batches = run.batches,
            migrated = run.migrated,
            examined = run.examined,
            errors = run.errors.len(),
            "Migration pass converged"
        );

        Ok(run)
    }

    /// Start the background job that runs a pass every hour.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut pass_interval = interval(PASS_INTERVAL);
            pass_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                pass_interval.tick().await;

                tracing::info!("Starting scheduled migration pass");

                match self.run_until_converged().await {
                    Ok(run) => {
                        for error in &run.errors {
                            tracing::warn!(error = %error, "Item failed during scheduled migration");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduled migration pass failed");
                    }
                }
            }
        })
    }
}
