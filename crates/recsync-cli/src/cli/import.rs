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

use crate::commands::ImportOptions;
use crate::error::CliError;
use clap::Args;
use recsync_client::{ClientConfig, Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Arguments of `recsync import`.
#[derive(Args)]
pub struct ImportArgs {
    /// Schema file (YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: String,

    /// CSV file (reads stdin when omitted)
    #[arg(value_name = "CSV")]
    pub csv: Option<String>,

    /// Authentication token
    #[arg(long, env = "RECSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Account email, used with --password when no token is given
    #[arg(long, env = "RECSYNC_EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "RECSYNC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Customer id (defaults to the first customer of the account)
    #[arg(long)]
    pub customer: Option<String>,

    /// Record API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Record type order, comma separated
    #[arg(long, value_delimiter = ',', value_name = "TYPES")]
    pub order: Vec<String>,

    /// CSV field delimiter
    #[arg(short, long, default_value = ",")]
    pub delimiter: char,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Build and match records without contacting the record API
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    /// Resolve credentials and build the import options.
    ///
    /// A token wins over email and password. Dry runs need no credentials.
    pub fn into_options(self) -> Result<ImportOptions, CliError> {
        let credentials = match (self.token, self.email, self.password) {
            (Some(token), _, _) => Some(Credentials::Token(token)),
            (None, Some(email), Some(password)) => Some(Credentials::Password { email, password }),
            (None, Some(_), None) => {
                return Err(CliError::invalid_input("--email requires --password"));
            }
            _ => None,
        };

        if credentials.is_none() && !self.dry_run {
            return Err(CliError::invalid_input(
                "provide --token, or --email and --password (or use --dry-run)",
            ));
        }

        Ok(ImportOptions {
            schema: self.schema,
            csv: self.csv,
            credentials,
            client: ClientConfig {
                base_url: self.base_url,
                customer: self.customer,
                timeout_secs: self.timeout,
                ..ClientConfig::default()
            },
            order: self.order,
            delimiter: self.delimiter,
            jobs: self.jobs,
            dry_run: self.dry_run,
        })
    }
}
