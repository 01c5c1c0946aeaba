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

//! recsync command line interface

use clap::Parser;
use recsync_cli::cli::Commands;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// recsync - sync CSV rows into a record store
///
/// Each row of the input is mapped through a YAML schema into one or more
/// remote records, which are created or updated so the store matches the
/// file.
///
/// # Examples
///
/// ```bash
/// # Check that a schema compiles
/// recsync check admissions.yaml
///
/// # Preview the objects built from the first rows
/// recsync render admissions.yaml applicants.csv --limit 5
///
/// # Import without sending anything
/// recsync import admissions.yaml applicants.csv --dry-run
///
/// # Import for real
/// RECSYNC_TOKEN=... recsync import admissions.yaml applicants.csv --jobs 8
/// ```
#[derive(Parser)]
#[command(name = "recsync")]
#[command(author, version, about = "recsync - sync CSV rows into a record store", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "recsync=debug" } else { "recsync=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
