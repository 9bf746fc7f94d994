use std::path::PathBuf;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, error, info};
use tokio_util::sync::CancellationToken;

use crate::collectors::collector::Collector;
use crate::error::CollectError;
use crate::models::{BatchSummary, CollectOutcome};

/// One root document and the collector that will handle it
pub struct CollectJob {
    pub source: PathBuf,
    pub collector: Collector,
}

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub summary: BatchSummary,
    /// Sources whose collection succeeded (skipped ones included)
    pub succeeded: Vec<PathBuf>,
}

/// Run independent jobs concurrently.
///
/// Every job gets its own cancellation token, so a failing document never
/// affects the others. Failures are logged and counted.
pub async fn run_batch(jobs: Vec<CollectJob>) -> BatchReport {
    let mut pending: FuturesUnordered<_> = jobs
        .into_iter()
        .map(|job| {
            let source = job.source;
            debug!(
                "Collecting {} into {} as {}",
                job.collector.uri(),
                job.collector.base().display(),
                job.collector.object_key()
            );
            let completion = job.collector.collect(CancellationToken::new());
            async move {
                let result = completion.await.unwrap_or_else(|_| {
                    Err(CollectError::Interrupted {
                        uri: source.to_string_lossy().to_string(),
                    })
                });
                (source, result)
            }
        })
        .collect();

    let mut report = BatchReport::default();
    while let Some((source, result)) = pending.next().await {
        match result {
            Ok(CollectOutcome::Skipped) => {
                info!("{} is up to date", source.display());
                report.summary.record(true);
                report.succeeded.push(source);
            }
            Ok(CollectOutcome::Collected { .. }) => {
                report.summary.record(true);
                report.succeeded.push(source);
            }
            Err(e) => {
                error!("Failed to collect {}: {}", source.display(), e);
                report.summary.record(false);
            }
        }
    }

    report
}
