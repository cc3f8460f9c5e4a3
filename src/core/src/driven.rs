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

//! Ports of the engine: the adjacency store, its snapshot cursor, the row
//! source, the dump sink and the progress observer.

use std::collections::BTreeMap;

use silo_common::{DataLink, DataNode, DataRow, Result};

use crate::entity::Status;

/// Ordered persistent mapping from a node to its neighbor set.
///
/// The snapshot borrows the backend, so the borrow checker enforces the
/// release order required by the engine: a snapshot must be dropped before
/// the backend can be closed, and no writes can interleave with an open
/// snapshot.
pub trait Backend {
    type Snapshot<'a>: Snapshot
    where
        Self: 'a;

    /// Append `value` into the neighbor set of `key`. Idempotent on
    /// duplicates. Writes may be buffered until [`Backend::close`].
    fn store(&mut self, key: &DataNode, value: &DataNode) -> Result<()>;

    /// Read the neighbor set of `key`, empty if absent. Dump goes through
    /// the snapshot instead.
    fn get(&self, key: &DataNode) -> Result<Vec<DataNode>>;

    /// Open a destructive cursor over all keys currently present. Writes
    /// issued after creation are not observed.
    fn snapshot(&mut self) -> Result<Self::Snapshot<'_>>;

    /// Flush buffered writes and release the store.
    fn close(self) -> Result<()>;
}

/// Destructive cursor over the adjacency store, owned by the dump loop.
///
/// The union of nodes returned by interleaved `next` and `pull_all` calls
/// is exactly the set of keys visible when the snapshot was opened.
pub trait Snapshot {
    /// Any key not yet pulled, in implementation-defined order; `None` once
    /// exhausted.
    fn next(&mut self) -> Result<Option<DataNode>>;

    /// The neighbor set of `node`; marks `node` as consumed. Idempotent: a
    /// second pull of the same node yields an empty set.
    fn pull_all(&mut self, node: &DataNode) -> Result<Vec<DataNode>>;
}

/// Source of input rows. `None` signals a clean end of stream; resources
/// are released on drop.
pub trait DataRowReader {
    fn read_row(&mut self) -> anyhow::Result<Option<DataRow>>;
}

/// Sink for `(node, entity uuid)` records emitted during dump.
pub trait DumpWriter {
    fn write_node(&mut self, node: &DataNode, uuid: &str) -> anyhow::Result<()>;

    fn flush(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Progress callbacks. All methods default to no-ops so implementations
/// subscribe only to what they need.
pub trait Observer {
    fn on_row(&mut self, _row: &DataRow) {}

    fn on_link(&mut self, _link: &DataLink) {}

    fn on_entity(&mut self, _status: Status, _counts: &BTreeMap<String, usize>) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl Observer for NoopObserver {}
