// Copyright 2025 SILO Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end reconciliation scenarios: line-delimited JSON in, persistent
//! store in between, `(node, uuid)` records out.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use silo_cmd::jsonline::JsonLinesReader;
use silo_common::{DataNode, Value};
use silo_core::test_utils::{CollectingWriter, CountingObserver};
use silo_core::{Config, Driver, NoopObserver, Status};
use silo_storage::RocksBackend;

fn scan_jsonl(path: &Path, config: Config, input: &str) {
    let backend = RocksBackend::open(path).unwrap();
    let mut driver = Driver::new(backend, config);
    driver
        .scan(JsonLinesReader::new(input.as_bytes()), &mut NoopObserver)
        .unwrap();
    driver.close().unwrap();
}

fn dump_all(path: &Path, config: Config) -> (CollectingWriter, CountingObserver) {
    let backend = RocksBackend::open(path).unwrap();
    let mut driver = Driver::new(backend, config);
    let mut writer = CollectingWriter::default();
    let mut observer = CountingObserver::default();
    driver.dump(&mut writer, &mut observer).unwrap();
    driver.close().unwrap();
    (writer, observer)
}

fn group_by_uuid(writer: &CollectingWriter) -> HashMap<String, Vec<DataNode>> {
    let mut groups: HashMap<String, Vec<DataNode>> = HashMap::new();
    for (node, uuid) in &writer.records {
        groups.entry(uuid.clone()).or_default().push(node.clone());
    }
    groups
}

#[test]
fn test_two_rows_sharing_a_value_merge() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    scan_jsonl(
        &store,
        Config::default(),
        "{\"A\": 1, \"B\": \"x\"}\n{\"B\": \"x\", \"C\": true}\n",
    );
    let (writer, observer) = dump_all(&store, Config::default());

    assert_eq!(writer.records.len(), 3);
    assert_eq!(group_by_uuid(&writer).len(), 1);
    let (status, counts) = &observer.entities[0];
    assert_eq!(*status, Status::Consistent);
    assert_eq!(
        *counts,
        BTreeMap::from([("A".into(), 1), ("B".into(), 1), ("C".into(), 1)])
    );
}

#[test]
fn test_conflicting_values_are_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    scan_jsonl(
        &store,
        Config::default(),
        "{\"A\": 1, \"B\": \"x\"}\n{\"A\": 2, \"B\": \"x\"}\n",
    );
    let (writer, observer) = dump_all(&store, Config::default());

    assert_eq!(writer.records.len(), 4);
    assert_eq!(group_by_uuid(&writer).len(), 1);
    let (status, counts) = &observer.entities[0];
    assert_eq!(*status, Status::Inconsistent);
    assert_eq!(counts.get("A"), Some(&2));
}

#[test]
fn test_disjoint_rows_stay_separate() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    scan_jsonl(
        &store,
        Config::default(),
        "{\"A\": 1, \"B\": \"x\"}\n{\"A\": 2, \"B\": \"y\"}\n",
    );
    let (writer, _) = dump_all(&store, Config::default());

    let groups = group_by_uuid(&writer);
    assert_eq!(groups.len(), 2);
    assert!(groups.values().all(|nodes| nodes.len() == 2));
}

#[test]
fn test_singleton_row_forms_an_entity() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    scan_jsonl(&store, Config::default(), "{\"A\": 1}\n");
    let (writer, observer) = dump_all(&store, Config::default());

    assert_eq!(writer.records.len(), 1);
    let (status, counts) = &observer.entities[0];
    assert_eq!(*status, Status::Consistent);
    assert_eq!(*counts, BTreeMap::from([("A".into(), 1)]));
}

#[test]
fn test_include_restricts_and_alias_renames() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    let config = Config::builder().include("A").alias("A", "Z").build().unwrap();
    scan_jsonl(&store, config, "{\"A\": 1, \"B\": \"x\"}\n");
    let (writer, _) = dump_all(&store, Config::default());

    assert_eq!(writer.records.len(), 1);
    assert_eq!(writer.records[0].0, DataNode::new("Z", Value::Int(1)));
}

#[test]
fn test_number_and_string_kinds_stay_apart() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    scan_jsonl(&store, Config::default(), "{\"A\": 1}\n{\"A\": \"1\"}\n");
    let (writer, _) = dump_all(&store, Config::default());

    assert_eq!(writer.records.len(), 2);
    assert_eq!(group_by_uuid(&writer).len(), 2);
}

#[test]
fn test_null_only_rows_contribute_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    scan_jsonl(
        &store,
        Config::default(),
        "{\"A\": null, \"B\": null}\n{\"C\": 7}\n",
    );
    let (writer, _) = dump_all(&store, Config::default());

    assert_eq!(writer.records.len(), 1);
    assert_eq!(writer.records[0].0, DataNode::new("C", Value::Int(7)));
}

#[test]
fn test_dump_include_drives_status_not_emission() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    scan_jsonl(&store, Config::default(), "{\"A\": 1, \"B\": \"x\"}\n");
    let (writer, observer) = dump_all(&store, Config::builder().include("A").build().unwrap());

    // Every node is still emitted; only the status computation narrows.
    assert_eq!(writer.records.len(), 2);
    let (status, counts) = &observer.entities[0];
    assert_eq!(*status, Status::Complete);
    assert_eq!(*counts, BTreeMap::from([("A".into(), 1)]));
}

#[test]
fn test_every_stored_key_is_emitted_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");

    scan_jsonl(
        &store,
        Config::default(),
        "{\"A\": 1, \"B\": 1, \"C\": 1}\n{\"C\": 1, \"D\": 1}\n{\"E\": 5}\n",
    );
    let (writer, _) = dump_all(&store, Config::default());

    assert_eq!(writer.records.len(), 5);
    let distinct: HashSet<_> = writer.records.iter().map(|(node, _)| node.clone()).collect();
    assert_eq!(distinct.len(), 5);
    assert_eq!(group_by_uuid(&writer).len(), 2);
}
