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

//! RocksDB-backed adjacency store.
//!
//! Keys are binary node encodings, values are encoded neighbor sets; the
//! engine's ordered iteration drives the dump snapshot. The store directory
//! is owned by the engine; its `CURRENT` manifest doubles as the validity
//! marker when opening an existing directory.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rocksdb::{DBRawIterator, Options, DB};
use silo_common::codec::{
    decode_neighbor_set, decode_node_bytes, encode_neighbor_set, encode_node,
};
use silo_common::{DataNode, Result, SiloError};
use silo_core::{Backend, Snapshot};
use tracing::debug;

const ENGINE_MARKER: &str = "CURRENT";

pub struct RocksBackend {
    db: DB,
    path: PathBuf,
}

impl RocksBackend {
    /// Open the store at `path`, creating the directory if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_path(path)?;

        let mut options = Options::default();
        options.create_if_missing(true);
        let db = DB::open(&options, path).map_err(SiloError::storage)?;
        debug!(path = %path.display(), "silo store opened");

        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn validate_path(path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        // Absent directories are created by the engine.
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(SiloError::storage(err)),
    };

    if !metadata.is_dir() {
        return Err(SiloError::PathNotValid {
            path: path.to_path_buf(),
        });
    }

    let mut entries = fs::read_dir(path).map_err(SiloError::storage)?;
    if entries.next().is_some() && !path.join(ENGINE_MARKER).exists() {
        return Err(SiloError::PathNotValid {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

impl Backend for RocksBackend {
    type Snapshot<'a>
        = RocksSnapshot<'a>
    where
        Self: 'a;

    fn store(&mut self, key: &DataNode, value: &DataNode) -> Result<()> {
        let key_bytes = encode_node(key);
        let value_bytes = encode_node(value);

        let mut neighbors = match self.db.get_pinned(&key_bytes).map_err(SiloError::storage)? {
            Some(existing) => decode_neighbor_set(&existing)?,
            None => BTreeSet::new(),
        };
        // Duplicate links leave the stored set untouched.
        if neighbors.insert(value_bytes) {
            self.db
                .put(&key_bytes, encode_neighbor_set(&neighbors))
                .map_err(SiloError::storage)?;
        }
        Ok(())
    }

    fn get(&self, key: &DataNode) -> Result<Vec<DataNode>> {
        let Some(existing) = self
            .db
            .get_pinned(encode_node(key))
            .map_err(SiloError::storage)?
        else {
            return Ok(Vec::new());
        };
        decode_neighbor_set(&existing)?
            .iter()
            .map(|blob| Ok(decode_node_bytes(blob)?))
            .collect()
    }

    fn snapshot(&mut self) -> Result<Self::Snapshot<'_>> {
        // The raw iterator pins its view of the keyspace at creation.
        let iter = self.db.raw_iterator();
        Ok(RocksSnapshot {
            db: &self.db,
            iter,
            started: false,
            pulled: HashSet::new(),
        })
    }

    fn close(self) -> Result<()> {
        self.db.flush().map_err(SiloError::storage)?;
        debug!(path = %self.path.display(), "silo store closed");
        Ok(())
    }
}

/// Iterate-once snapshot: one forward iterator over the keyspace plus the
/// set of already pulled keys. `next` advances past pulled keys, `pull_all`
/// point-reads the store and records the key.
///
/// Memory is bounded by the pulled set, which the driver drains component
/// by component, at the price of one point read per pulled node. The
/// backend is exclusively owned during dump, so the point reads observe the
/// same state the iterator pinned.
pub struct RocksSnapshot<'a> {
    db: &'a DB,
    iter: DBRawIterator<'a>,
    started: bool,
    pulled: HashSet<Vec<u8>>,
}

impl Snapshot for RocksSnapshot<'_> {
    fn next(&mut self) -> Result<Option<DataNode>> {
        loop {
            if self.started {
                self.iter.next();
            } else {
                self.iter.seek_to_first();
                self.started = true;
            }

            if !self.iter.valid() {
                self.iter.status().map_err(SiloError::storage)?;
                return Ok(None);
            }
            let Some(key) = self.iter.key() else {
                return Ok(None);
            };
            if self.pulled.contains(key) {
                continue;
            }
            return Ok(Some(decode_node_bytes(key)?));
        }
    }

    fn pull_all(&mut self, node: &DataNode) -> Result<Vec<DataNode>> {
        let key = encode_node(node);
        if !self.pulled.insert(key.clone()) {
            return Ok(Vec::new());
        }

        let Some(existing) = self.db.get_pinned(&key).map_err(SiloError::storage)? else {
            return Ok(Vec::new());
        };
        decode_neighbor_set(&existing)?
            .iter()
            .map(|blob| Ok(decode_node_bytes(blob)?))
            .collect()
    }
}
