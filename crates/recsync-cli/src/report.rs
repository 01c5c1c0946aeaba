// Dweve Recsync - Tabular Record Synchronization
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Run progress and the end-of-run summary.

use crate::error::CliError;
use colored::Colorize;
use recsync_core::{RowReport, Summary};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// Rows between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Thread-safe counters fed by the pipeline workers.
///
/// The counts survive an interrupted run, so a cancelled import can still
/// report what it did.
#[derive(Debug)]
pub struct ProgressTracker {
    rows: AtomicUsize,
    created: AtomicUsize,
    updated: AtomicUsize,
    unchanged: AtomicUsize,
    skipped: AtomicUsize,
    errored: AtomicUsize,
    rejected: AtomicUsize,
    interval: usize,
    start_time: Instant,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

impl ProgressTracker {
    /// A tracker logging progress every `interval` rows (0 disables it).
    pub fn new(interval: usize) -> Self {
        Self {
            rows: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
            updated: AtomicUsize::new(0),
            unchanged: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            errored: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
            interval,
            start_time: Instant::now(),
        }
    }

    /// Count a processed row.
    pub fn record(&self, report: &RowReport) {
        let summary = report.summary();
        self.created.fetch_add(summary.created, Ordering::Relaxed);
        self.updated.fetch_add(summary.updated, Ordering::Relaxed);
        self.unchanged.fetch_add(summary.unchanged, Ordering::Relaxed);
        self.skipped.fetch_add(summary.skipped, Ordering::Relaxed);
        self.errored.fetch_add(summary.errored, Ordering::Relaxed);
        let rows = self.rows.fetch_add(summary.rows, Ordering::Relaxed) + summary.rows;

        if self.interval > 0 && rows % self.interval == 0 {
            let rate = rows as f64 / self.start_time.elapsed().as_secs_f64();
            info!(
                rows,
                errored = self.errored.load(Ordering::Relaxed),
                "progress ({:.1} rows/s)",
                rate
            );
        }
    }

    /// Count a CSV record that could not be read.
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts so far.
    pub fn summary(&self) -> Summary {
        Summary {
            rows: self.rows.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            errored: self.errored.load(Ordering::Relaxed),
        }
    }

    /// Freeze the counters into a report.
    pub fn finish(&self, dry_run: bool, interrupted: bool) -> ImportReport {
        ImportReport {
            summary: self.summary(),
            rejected: self.rejected.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
            dry_run,
            interrupted,
        }
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Mapping counts.
    pub summary: Summary,
    /// CSV records skipped because they could not be read.
    pub rejected: usize,
    /// Wall time of the run.
    pub elapsed: Duration,
    /// Nothing was sent to the record API.
    pub dry_run: bool,
    /// The run was stopped before the input was exhausted.
    pub interrupted: bool,
}

impl ImportReport {
    /// Fail when any row or mapping failed.
    pub fn into_result(self) -> Result<(), CliError> {
        if self.summary.errored > 0 || self.rejected > 0 {
            return Err(CliError::Incomplete {
                errored: self.summary.errored,
                rejected: self.rejected,
            });
        }
        Ok(())
    }

    /// Print the summary table to stdout.
    pub fn print_summary(&self) {
        let summary = &self.summary;
        let title = match (self.dry_run, self.interrupted) {
            (_, true) => "import (interrupted)",
            (true, false) => "import (dry run)",
            (false, false) => "import",
        };

        println!();
        println!("{}", "═".repeat(60).bright_blue());
        println!("{} {}", "Run:".bright_blue().bold(), title.bright_white());
        println!("{}", "═".repeat(60).bright_blue());
        println!(
            "  {} {}",
            "Rows:".bright_cyan(),
            summary.rows.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Created:".green().bold(),
            summary.created.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Updated:".green().bold(),
            summary.updated.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Unchanged:".bright_cyan(),
            summary.unchanged.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Skipped:".yellow(),
            summary.skipped.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Failed:".red().bold(),
            summary.errored.to_string().bright_white()
        );
        if self.rejected > 0 {
            println!(
                "  {} {}",
                "Rejected rows:".red().bold(),
                self.rejected.to_string().bright_white()
            );
        }
        println!(
            "  {} {:.2}s",
            "Elapsed:".bright_cyan(),
            self.elapsed.as_secs_f64()
        );
        println!(
            "  {} {:.1} rows/s",
            "Throughput:".bright_cyan(),
            summary.rows as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
        );
        println!("{}", "═".repeat(60).bright_blue());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsync_core::{MappingOutcome, Row, UpsertOutcome};
    use serde_json::Map;

    fn report(outcomes: Vec<UpsertOutcome>) -> RowReport {
        RowReport {
            row: Row::new(),
            outcomes: outcomes
                .into_iter()
                .enumerate()
                .map(|(index, result)| MappingOutcome {
                    record_type: "person".to_string(),
                    index,
                    result: Ok(result),
                })
                .collect(),
        }
    }

    #[test]
    fn test_tracker_accumulates_rows() {
        let tracker = ProgressTracker::new(0);
        tracker.record(&report(vec![
            UpsertOutcome::Created(Map::new()),
            UpsertOutcome::Skipped,
        ]));
        tracker.record(&report(vec![UpsertOutcome::Unchanged(Map::new())]));
        tracker.record_rejected();

        let finished = tracker.finish(true, false);
        assert_eq!(finished.summary.rows, 2);
        assert_eq!(finished.summary.created, 1);
        assert_eq!(finished.summary.skipped, 1);
        assert_eq!(finished.summary.unchanged, 1);
        assert_eq!(finished.rejected, 1);
    }

    #[test]
    fn test_clean_report_succeeds() {
        let tracker = ProgressTracker::new(0);
        tracker.record(&report(vec![UpsertOutcome::Created(Map::new())]));
        assert!(tracker.finish(false, false).into_result().is_ok());
    }

    #[test]
    fn test_rejected_rows_fail_the_run() {
        let tracker = ProgressTracker::new(0);
        tracker.record_rejected();
        let err = tracker.finish(false, false).into_result().unwrap_err();
        assert!(matches!(
            err,
            CliError::Incomplete {
                errored: 0,
                rejected: 1
            }
        ));
    }
}
