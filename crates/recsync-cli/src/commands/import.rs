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

//! Import command - sync CSV rows into the record API

use super::{load_stages, read_input, reader_config};
use crate::dry_run::DryRunStore;
use crate::error::CliError;
use crate::report::{ImportReport, ProgressTracker};
use recsync_client::{ClientConfig, Credentials, RestStore};
use recsync_core::{CancelToken, Pipeline, RecordStore, SyncError, WorkerConfig};
use recsync_csv::RowReader;
use tracing::{error, info, warn};

/// Everything `import` needs, independent of how it was parsed.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Schema file path.
    pub schema: String,
    /// CSV file path; standard input when `None`.
    pub csv: Option<String>,
    /// Record API credentials. Required unless `dry_run` is set.
    pub credentials: Option<Credentials>,
    /// Record API location.
    pub client: ClientConfig,
    /// Explicit record type order; empty keeps the schema's order.
    pub order: Vec<String>,
    /// CSV field delimiter.
    pub delimiter: char,
    /// Worker threads; 0 uses one per CPU.
    pub jobs: usize,
    /// Use [`DryRunStore`] instead of the record API.
    pub dry_run: bool,
}

impl ImportOptions {
    /// Options for a schema with every other setting at its default.
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            csv: None,
            credentials: None,
            client: ClientConfig::default(),
            order: Vec::new(),
            delimiter: ',',
            jobs: 0,
            dry_run: false,
        }
    }
}

/// Import every row of a CSV input.
///
/// The schema is compiled and the CSV header validated before the store
/// is contacted. CSV records that cannot be read are logged and skipped.
/// Ctrl-C stops the run after the mappings in flight; the summary is
/// printed either way.
///
/// # Errors
///
/// Fails on unreadable input, an invalid schema, a rejected session or an
/// interrupted run. Per-mapping failures are reported through
/// [`ImportReport`] instead.
pub fn import(options: &ImportOptions) -> Result<ImportReport, CliError> {
    let stages = load_stages(&options.schema, &options.order)?;
    let input = read_input(options.csv.as_deref())?;
    let reader = RowReader::new(input.as_bytes(), &reader_config(options.delimiter)?)?;

    let store: Box<dyn RecordStore> = if options.dry_run {
        info!("dry run: nothing will be sent to the record API");
        Box::new(DryRunStore::new())
    } else {
        let credentials = options
            .credentials
            .clone()
            .ok_or_else(|| CliError::invalid_input("credentials are required unless --dry-run is set"))?;
        Box::new(RestStore::connect(options.client.clone(), credentials)?)
    };

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel);

    let pipeline = Pipeline::new(store, stages)?.with_cancel_token(cancel);
    let tracker = ProgressTracker::default();

    let rows = reader.filter_map(|result| match result {
        Ok(row) => Some(row),
        Err(e) => {
            error!(action = "error", error = %e, "skipping unreadable CSV record");
            tracker.record_rejected();
            None
        }
    });

    let result = pipeline.run_parallel_with(
        rows,
        &WorkerConfig::with_workers(options.jobs),
        |report| tracker.record(report),
    );

    match result {
        Ok(_) => {
            let report = tracker.finish(options.dry_run, false);
            report.print_summary();
            Ok(report)
        }
        Err(SyncError::Cancelled) => {
            tracker.finish(options.dry_run, true).print_summary();
            Err(SyncError::Cancelled.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn install_interrupt_handler(cancel: &CancelToken) {
    let token = cancel.clone();
    let installed = ctrlc::set_handler(move || {
        eprintln!("Interrupted, finishing mappings in flight...");
        token.cancel();
    });
    if let Err(e) = installed {
        warn!(error = %e, "could not install Ctrl-C handler");
    }
}
