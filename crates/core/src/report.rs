//! Stage banners and batch bookkeeping.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use anyhow::{Context, Result};
use log::{error, info};
use rayon::prelude::*;

use crate::Error;

const RULE: &str =
    "═══════════════════════════════════════════════════════════════════════════════";

/// Outcome of one batch operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: Vec<PathBuf>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// `Err(PartialBatchFailure)` naming the failed files, if any.
    pub fn ok_or_fail(self, operation: &str) -> Result<usize> {
        if self.failed.is_empty() {
            return Ok(self.succeeded);
        }
        Err(Error::PartialBatchFailure {
            operation: operation.to_string(),
            failed: self.failed.len(),
            total: self.total(),
            files: self.failed,
        }
        .into())
    }
}

/// Scopes log output per stage and keeps running pass/fail counts.
///
/// Shared by reference across rayon workers, so the counters are atomic.
#[derive(Debug, Default)]
pub struct Reporter {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn banner(&self, title: &str) {
        info!("{RULE}");
        info!("{title}");
        info!("{RULE}");
    }

    /// Run one numbered pipeline stage, logging its name and duration.
    pub fn stage<T>(
        &self,
        name: &str,
        step: usize,
        total: usize,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        info!("[{step}/{total}] {name}");
        let start = Instant::now();
        let value = f().with_context(|| format!("Step '{name}' failed"))?;
        info!("  ✓ {name} ({:.2}s)", start.elapsed().as_secs_f64());
        Ok(value)
    }

    /// Run `op` on every path in parallel, collecting every failure.
    ///
    /// Each failure is logged with its full context chain, the batch is
    /// summarised as `"{label}: N succeeded, M failed"` and the counts are
    /// added to the running totals. Failures become a
    /// [`Error::PartialBatchFailure`].
    pub fn run_batch<P, F>(&self, label: &str, paths: &[P], op: F) -> Result<usize>
    where
        P: AsRef<Path> + Sync,
        F: Fn(&Path) -> Result<()> + Sync,
    {
        self.run_batch_with(label, paths, |p| p.as_ref().to_path_buf(), |p| op(p.as_ref()))
    }

    /// [`Self::run_batch`] over arbitrary items, each identified by the file `path_of` names.
    pub fn run_batch_with<T, P, F>(&self, label: &str, items: &[T], path_of: P, op: F) -> Result<usize>
    where
        T: Sync,
        P: Fn(&T) -> PathBuf + Sync,
        F: Fn(&T) -> Result<()> + Sync,
    {
        let results: Vec<(PathBuf, Result<()>)> = items
            .par_iter()
            .map(|item| {
                let path = path_of(item);
                let result = op(item).with_context(|| format!("Failed to process {}", path.display()));
                (path, result)
            })
            .collect();

        let mut result = BatchResult::default();
        for (path, r) in results {
            match r {
                Ok(()) => result.succeeded += 1,
                Err(e) => {
                    error!("{e:#}");
                    result.failed.push(path);
                }
            }
        }

        self.record(&result);
        info!("{label}: {} succeeded, {} failed", result.succeeded, result.failed.len());
        result.ok_or_fail(label)
    }

    fn record(&self, result: &BatchResult) {
        self.succeeded.fetch_add(result.succeeded, Ordering::Relaxed);
        self.failed.fetch_add(result.failed.len(), Ordering::Relaxed);
    }

    /// Files processed successfully so far, across all batches.
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;

    #[test]
    fn batch_collects_every_failure() {
        let reporter = Reporter::new();
        let paths = ["a.ttf", "bad-1.ttf", "c.ttf", "bad-2.ttf"];

        let err = reporter
            .run_batch("Check", &paths, |path| {
                if path.to_string_lossy().starts_with("bad") {
                    bail!("rejected");
                }
                Ok(())
            })
            .unwrap_err();

        let Some(Error::PartialBatchFailure { operation, failed, total, files }) =
            err.downcast_ref::<Error>()
        else {
            panic!("unexpected error: {err:#}");
        };
        assert_eq!(operation, "Check");
        assert_eq!((*failed, *total), (2, 4));
        assert_eq!(files, &[PathBuf::from("bad-1.ttf"), PathBuf::from("bad-2.ttf")]);
        assert_eq!((reporter.succeeded(), reporter.failed()), (2, 2));
    }

    #[test]
    fn totals_accumulate_across_batches() {
        let reporter = Reporter::new();
        assert_eq!(reporter.run_batch("One", &["a.ttf"], |_| Ok(())).unwrap(), 1);
        assert_eq!(reporter.run_batch("Two", &["b.ttf", "c.ttf"], |_| Ok(())).unwrap(), 2);
        assert_eq!((reporter.succeeded(), reporter.failed()), (3, 0));
    }

    #[test]
    fn stage_passes_through_the_value() {
        let reporter = Reporter::new();
        assert_eq!(reporter.stage("answer", 1, 1, || Ok(42)).unwrap(), 42);
        assert!(reporter.stage("broken", 1, 1, || -> Result<()> { bail!("no") }).is_err());
    }
}
