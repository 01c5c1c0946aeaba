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

//! End-to-end reconciliation against the in-memory store.
//!
//! Covers the behaviours a sync run must guarantee:
//! - Creating a fresh object and merging its id back
//! - Idempotent re-runs issuing no writes
//! - Forward references between stages of one row
//! - Failure isolation per mapping
//! - Cancellation stopping the run

use recsync_core::{
    derive_query, CancelToken, Mapping, Object, Pipeline, RecordStore, SchemaNode, Stage,
    StoreError, SyncError, UpsertOutcome, Upserter, Value, WorkerConfig,
};
use recsync_test::{fixtures, MemoryStore, Operation};
use serde_json::json;

// ===== Test Helpers =====

fn scenario_mapping() -> Mapping {
    Mapping::new(SchemaNode::from_json(&fixtures::scenario_schema()).unwrap()).unwrap()
}

fn built(mapping: &Mapping, row: &recsync_core::Row) -> Object {
    mapping.build(row).unwrap().expect("row satisfies mapping")
}

// ===== Upsert =====

#[test]
fn test_scenario_creates_and_merges_id() {
    let store = MemoryStore::new();
    let upserter = Upserter::new(&store);
    let mut obj = built(&scenario_mapping(), &fixtures::scenario_row());

    let query = derive_query(&obj).unwrap();
    assert_eq!(query.len(), 1);
    assert_eq!(query["name"], Value::from("Acme"));

    let outcome = upserter.upsert("organization", &mut obj).unwrap();
    assert!(matches!(outcome, UpsertOutcome::Created(_)));
    assert_eq!(obj["id"], Value::from("1"));

    let calls = store.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].operation, Operation::Filter);
    assert_eq!(calls[1].operation, Operation::Create);
    let body = calls[1].body.as_ref().unwrap();
    assert_eq!(
        serde_json::Value::Object(body.clone()),
        json!({"name": "Acme", "location": {"city": "Boston"}})
    );
}

#[test]
fn test_second_upsert_is_idempotent() {
    let store = MemoryStore::new();
    let upserter = Upserter::new(&store);
    let mapping = scenario_mapping();
    let row = fixtures::scenario_row();

    upserter
        .upsert("organization", &mut built(&mapping, &row))
        .unwrap();
    let outcome = upserter
        .upsert("organization", &mut built(&mapping, &row))
        .unwrap();

    assert!(matches!(outcome, UpsertOutcome::Unchanged(_)));
    assert_eq!(store.count(Operation::Create), 1);
    assert_eq!(store.count(Operation::Update), 0);
}

#[test]
fn test_changed_field_triggers_update() {
    let store = MemoryStore::new();
    store.seed(
        "organization",
        json!({"id": 3, "name": "Acme", "location": {"city": "Cambridge"}}),
    );
    let upserter = Upserter::new(&store);
    let mut obj = built(&scenario_mapping(), &fixtures::scenario_row());

    let outcome = upserter.upsert("organization", &mut obj).unwrap();
    let UpsertOutcome::Updated { patch, .. } = outcome else {
        panic!("expected an update, got {:?}", outcome);
    };
    assert_eq!(patch.keys().collect::<Vec<_>>(), ["location"]);
    assert_eq!(obj["id"], Value::from("3"));
    assert_eq!(
        store.records("organization")[0]["location"],
        json!({"city": "Boston"})
    );
}

#[test]
fn test_update_body_carries_remote_only_fields() {
    let store = MemoryStore::new();
    store.seed(
        "organization",
        json!({"id": 3, "name": "Acme", "phone": "555-0100", "location": {"city": "Cambridge"}}),
    );
    let upserter = Upserter::new(&store);
    let mut obj = built(&scenario_mapping(), &fixtures::scenario_row());

    upserter.upsert("organization", &mut obj).unwrap();

    let calls = store.calls();
    let update = calls
        .iter()
        .find(|c| c.operation == Operation::Update)
        .unwrap();
    assert_eq!(
        serde_json::Value::Object(update.body.clone().unwrap()),
        json!({"id": 3, "name": "Acme", "phone": "555-0100", "location": {"city": "Boston"}})
    );
}

// ===== Pipeline =====

#[test]
fn test_admissions_run() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(&store, fixtures::admissions_stages()).unwrap();

    let summary = pipeline.run(fixtures::admissions_rows()).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.created, 8);
    assert_eq!(summary.unchanged, 1);
    assert!(summary.is_clean());

    let applicants = store.records("applicant");
    assert_eq!(applicants.len(), 3);
    assert_eq!(applicants[0]["name"], json!("Ada Lovelace"));
    assert_eq!(applicants[0]["organization"], json!("1"));
    assert_eq!(applicants[0]["person"], json!("2"));
    assert_eq!(applicants[0]["active"], json!(true));
    assert_eq!(applicants[1]["organization"], json!("1"));

    let orgs = store.records("organization");
    assert_eq!(orgs.len(), 2);
    assert!(orgs[1].get("url").is_none());
}

#[test]
fn test_rerun_issues_no_writes() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(&store, fixtures::admissions_stages()).unwrap();
    pipeline.run(fixtures::admissions_rows()).unwrap();
    let writes = store.count(Operation::Create) + store.count(Operation::Update);

    let summary = pipeline.run(fixtures::admissions_rows()).unwrap();
    assert_eq!(summary.writes(), 0);
    assert_eq!(summary.unchanged, 9);
    assert_eq!(
        store.count(Operation::Create) + store.count(Operation::Update),
        writes
    );
}

#[test]
fn test_forward_reference_in_order() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(&store, fixtures::admissions_stages()).unwrap();

    let row = fixtures::admissions_rows().remove(0);
    let report = pipeline.process_row(row).unwrap();
    assert_eq!(report.row.handle("organization", "org"), Some("1"));
    assert_eq!(report.row.handle("person", "me"), Some("2"));
}

#[test]
fn test_forward_reference_wrong_order() {
    let store = MemoryStore::new();
    let mut stages = fixtures::admissions_stages();
    stages.reverse();
    let pipeline = Pipeline::new(&store, stages).unwrap();

    let row = fixtures::admissions_rows().remove(0);
    let summary = pipeline.process_row(row).unwrap().summary();

    // applicant runs first: its person reference is unresolved, so the
    // required field is missing and nothing is built
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.count_for(Operation::Create, "applicant"), 0);
    assert_eq!(store.count_for(Operation::Create, "organization"), 1);
}

#[test]
fn test_unresolved_reference_is_dropped() {
    let store = MemoryStore::new();
    let stage = Stage::compile(
        "applicant",
        [SchemaNode::from_json(&json!({
            "name": "first_name",
            "organization": "organization[org]",
        }))
        .unwrap()],
    )
    .unwrap();
    let pipeline = Pipeline::new(&store, vec![stage]).unwrap();

    let row = fixtures::admissions_rows().remove(0);
    pipeline.process_row(row).unwrap();

    let created = &store.records("applicant")[0];
    assert_eq!(created["name"], json!("Ada"));
    assert!(created.get("organization").is_none());
}

#[test]
fn test_store_failure_is_isolated() {
    let store = MemoryStore::new();
    store.fail_next(
        Operation::Create,
        Some("organization"),
        StoreError::Rejected {
            status: 400,
            message: "bad url".to_string(),
        },
    );
    let pipeline = Pipeline::new(&store, fixtures::admissions_stages()).unwrap();

    let report = pipeline
        .process_row(fixtures::admissions_rows().remove(0))
        .unwrap();
    let summary = report.summary();

    assert_eq!(summary.errored, 1);
    // person is the only required field of applicant
    assert_eq!(store.count_for(Operation::Create, "person"), 1);
    assert_eq!(store.count_for(Operation::Create, "applicant"), 1);
    assert!(report.row.handle("organization", "org").is_none());
    assert!(store.records("applicant")[0].get("organization").is_none());
}

#[test]
fn test_cancellation_from_store_stops_run() {
    let store = MemoryStore::new();
    store.fail_next(Operation::Filter, Some("person"), StoreError::Cancelled);
    let pipeline = Pipeline::new(&store, fixtures::admissions_stages()).unwrap();

    let result = pipeline.run(fixtures::admissions_rows());
    assert_eq!(result, Err(SyncError::Cancelled));
    assert_eq!(store.count_for(Operation::Filter, "applicant"), 0);
}

#[test]
fn test_cancel_token_stops_parallel_run() {
    let store = MemoryStore::new();
    let cancel = CancelToken::new();
    cancel.cancel();
    let pipeline = Pipeline::new(&store, fixtures::admissions_stages())
        .unwrap()
        .with_cancel_token(cancel);

    let result = pipeline.run_parallel(fixtures::admissions_rows(), &WorkerConfig::with_workers(2));
    assert_eq!(result, Err(SyncError::Cancelled));
    assert!(store.calls().is_empty());
}

#[test]
fn test_authentication_failure_before_rows() {
    let store = MemoryStore::new();
    store.reject_session(StoreError::Authentication("invalid token".to_string()));

    let err = Pipeline::new(&store, fixtures::admissions_stages()).unwrap_err();
    assert!(matches!(err, SyncError::Authentication(_)));
    assert!(store.calls().is_empty());
}

#[test]
fn test_parallel_run_processes_all_rows() {
    let store = MemoryStore::new();
    let pipeline = Pipeline::new(&store, fixtures::admissions_stages()).unwrap();

    let rows: Vec<_> = (0..5).flat_map(|_| fixtures::admissions_rows()).collect();
    let summary = pipeline
        .run_parallel(rows, &WorkerConfig::with_workers(3))
        .unwrap();

    assert_eq!(summary.rows, 15);
    assert!(summary.is_clean());
    // concurrent rows may duplicate entities, but every row built an applicant
    assert_eq!(store.count_for(Operation::Filter, "applicant"), 15);
}

#[test]
fn test_store_as_trait_object() {
    let store: Box<dyn RecordStore> = Box::new(MemoryStore::new());
    let pipeline = Pipeline::new(store, fixtures::admissions_stages()).unwrap();
    let summary = pipeline.run(fixtures::admissions_rows()).unwrap();
    assert_eq!(summary.created, 8);
}
