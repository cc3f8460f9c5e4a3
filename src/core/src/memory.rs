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

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use silo_common::codec::{decode_node_bytes, encode_node};
use silo_common::{DataNode, Result};

use crate::driven::{Backend, Snapshot};

type AdjacencyMap = BTreeMap<Vec<u8>, BTreeSet<Vec<u8>>>;

/// An in-memory adjacency store.
///
/// The map lives behind a shared handle, so a clone taken before handing
/// the backend to a driver keeps the contents inspectable afterwards. It
/// never spills, so the memory usage tracks the whole graph; use the
/// persistent backend for datasets larger than RAM.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<AdjacencyMap>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently present.
    pub fn node_count(&self) -> usize {
        self.inner.read().len()
    }
}

impl Backend for MemoryBackend {
    type Snapshot<'a>
        = MemorySnapshot
    where
        Self: 'a;

    fn store(&mut self, key: &DataNode, value: &DataNode) -> Result<()> {
        self.inner
            .write()
            .entry(encode_node(key))
            .or_default()
            .insert(encode_node(value));
        Ok(())
    }

    fn get(&self, key: &DataNode) -> Result<Vec<DataNode>> {
        let inner = self.inner.read();
        let Some(neighbors) = inner.get(&encode_node(key)) else {
            return Ok(Vec::new());
        };
        neighbors
            .iter()
            .map(|blob| Ok(decode_node_bytes(blob)?))
            .collect()
    }

    fn snapshot(&mut self) -> Result<Self::Snapshot<'_>> {
        Ok(MemorySnapshot {
            nodes: self.inner.read().clone(),
        })
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Load-once snapshot: the whole adjacency map is cloned at open,
/// `pull_all` removes entries and `next` yields the first remaining key.
/// O(store) memory against zero re-reads.
pub struct MemorySnapshot {
    nodes: AdjacencyMap,
}

impl Snapshot for MemorySnapshot {
    fn next(&mut self) -> Result<Option<DataNode>> {
        let Some(key) = self.nodes.keys().next() else {
            return Ok(None);
        };
        Ok(Some(decode_node_bytes(key)?))
    }

    fn pull_all(&mut self, node: &DataNode) -> Result<Vec<DataNode>> {
        let Some(neighbors) = self.nodes.remove(&encode_node(node)) else {
            return Ok(Vec::new());
        };
        neighbors
            .iter()
            .map(|blob| Ok(decode_node_bytes(blob)?))
            .collect()
    }
}
