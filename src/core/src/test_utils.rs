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

//! Test doubles for the driver ports, shared by the crates' test suites.

use std::collections::BTreeMap;

use silo_common::{DataLink, DataNode, DataRow};

use crate::driven::{DataRowReader, DumpWriter, Observer};
use crate::entity::Status;

/// Replays a fixed sequence of rows, then signals end of stream.
pub struct InMemoryReader {
    rows: std::vec::IntoIter<DataRow>,
}

impl InMemoryReader {
    pub fn new(rows: Vec<DataRow>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl DataRowReader for InMemoryReader {
    fn read_row(&mut self) -> anyhow::Result<Option<DataRow>> {
        Ok(self.rows.next())
    }
}

/// Yields `remaining` empty rows, then fails.
pub struct FailingReader {
    remaining: usize,
}

impl FailingReader {
    pub fn after(rows: usize) -> Self {
        Self { remaining: rows }
    }
}

impl DataRowReader for FailingReader {
    fn read_row(&mut self) -> anyhow::Result<Option<DataRow>> {
        if self.remaining == 0 {
            anyhow::bail!("synthetic read failure");
        }
        self.remaining -= 1;
        Ok(Some(DataRow::new()))
    }
}

/// Collects every emitted `(node, uuid)` record.
#[derive(Default)]
pub struct CollectingWriter {
    pub records: Vec<(DataNode, String)>,
}

impl DumpWriter for CollectingWriter {
    fn write_node(&mut self, node: &DataNode, uuid: &str) -> anyhow::Result<()> {
        self.records.push((node.clone(), uuid.to_owned()));
        Ok(())
    }
}

/// Counts notifications and keeps the finalized entities.
#[derive(Default)]
pub struct CountingObserver {
    pub rows: usize,
    pub links: usize,
    pub entities: Vec<(Status, BTreeMap<String, usize>)>,
}

impl Observer for CountingObserver {
    fn on_row(&mut self, _row: &DataRow) {
        self.rows += 1;
    }

    fn on_link(&mut self, _link: &DataLink) {
        self.links += 1;
    }

    fn on_entity(&mut self, status: Status, counts: &BTreeMap<String, usize>) {
        self.entities.push((status, counts.clone()));
    }
}
