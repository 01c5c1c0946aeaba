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

//! Command-line argument definitions.

mod import;

pub use import::ImportArgs;

use crate::commands;
use clap::Subcommand;

/// recsync subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create or update records from CSV rows
    ///
    /// Every row runs through the schema's record types in order. Records
    /// that already exist are matched by their lookup fields and updated
    /// only when a mapped value differs.
    Import(ImportArgs),

    /// Print the objects built from CSV rows
    ///
    /// Writes one JSON line per mapping and row. Nothing is sent anywhere;
    /// references to records created earlier in the row resolve to the
    /// handle name itself.
    Render {
        /// Schema file (YAML)
        #[arg(value_name = "SCHEMA")]
        schema: String,

        /// CSV file (reads stdin when omitted)
        #[arg(value_name = "CSV")]
        csv: Option<String>,

        /// Record type order, comma separated
        #[arg(long, value_delimiter = ',', value_name = "TYPES")]
        order: Vec<String>,

        /// CSV field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Stop after this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Load and compile a schema
    ///
    /// Lists each record type with its mapping count in execution order.
    Check {
        /// Schema file (YAML)
        #[arg(value_name = "SCHEMA")]
        schema: String,

        /// Record type order to validate, comma separated
        #[arg(long, value_delimiter = ',', value_name = "TYPES")]
        order: Vec<String>,
    },
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns the error message when the command fails.
    pub fn execute(self) -> Result<(), String> {
        let result = match self {
            Commands::Import(args) => args
                .into_options()
                .and_then(|options| commands::import(&options))
                .and_then(|report| report.into_result()),
            Commands::Render {
                schema,
                csv,
                order,
                delimiter,
                limit,
            } => commands::render(&schema, csv.as_deref(), &order, delimiter, limit),
            Commands::Check { schema, order } => commands::check(&schema, &order),
        };
        result.map_err(|e| e.to_string())
    }
}
