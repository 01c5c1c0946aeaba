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

//! Check command - schema compilation

use super::load_stages;
use crate::error::CliError;
use colored::Colorize;

/// Load and compile a schema, listing record types in execution order.
///
/// # Errors
///
/// Fails when the file cannot be read, is not a valid schema, or `order`
/// names a record type the schema does not define.
pub fn check(schema: &str, order: &[String]) -> Result<(), CliError> {
    let stages = match load_stages(schema, order) {
        Ok(stages) => stages,
        Err(e) => {
            println!("{} {}", "✗".red().bold(), schema);
            return Err(e);
        }
    };

    println!("{} {}", "✓".green().bold(), schema);
    for stage in &stages {
        println!(
            "  {}: {} mapping(s)",
            stage.record_type.bright_white(),
            stage.mappings.len()
        );
    }
    println!(
        "  Total: {} record type(s), {} mapping(s)",
        stages.len(),
        stages.iter().map(|s| s.mappings.len()).sum::<usize>()
    );
    Ok(())
}
