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

use silo_common::{Result, SiloError};
use tracing::trace;

use crate::config::Config;
use crate::driven::{Backend, DataRowReader, DumpWriter, Observer, Snapshot};
use crate::entity::Entity;
use crate::scan::scan_row;

/// Orchestrates the scan and dump loops over an exclusively owned backend.
pub struct Driver<B: Backend> {
    backend: B,
    config: Config,
}

impl<B: Backend> Driver<B> {
    pub fn new(backend: B, config: Config) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ingest rows until end of stream.
    ///
    /// Links from one row are fully persisted before the next row is read:
    /// both directions of every non-self link, one entry for a self-link.
    /// The observer sees each non-self link, then the row. The first error
    /// aborts; the reader is released on every exit path.
    pub fn scan(&mut self, mut reader: impl DataRowReader, observer: &mut impl Observer) -> Result<()> {
        loop {
            let row = match reader.read_row() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(cause) => return Err(SiloError::ReadingNextInput(cause)),
            };

            let (nodes, links) = scan_row(&self.config, &row);
            trace!(nodes = nodes.len(), links = links.len(), "row scanned");

            for link in links {
                self.backend
                    .store(&link.e1, &link.e2)
                    .map_err(SiloError::persisting)?;
                if !link.is_self_link() {
                    self.backend
                        .store(&link.e2, &link.e1)
                        .map_err(SiloError::persisting)?;
                    observer.on_link(&link);
                }
            }
            observer.on_row(&row);
        }

        Ok(())
    }

    /// Drain the store into entities.
    ///
    /// Each snapshot seed starts a fresh entity under a new UUID; a
    /// depth-first traversal pulls neighbor sets destructively, emitting
    /// every node on its first insertion. The traversal is an explicit
    /// stack, so component diameter does not bound the call stack.
    pub fn dump(&mut self, writer: &mut impl DumpWriter, observer: &mut impl Observer) -> Result<()> {
        let include = self.config.include_order().to_vec();
        let mut snapshot = self.backend.snapshot().map_err(SiloError::reading_persisted)?;

        while let Some(seed) = snapshot.next().map_err(SiloError::reading_persisted)? {
            let mut entity = Entity::new(include.clone());
            entity.append(seed.clone());
            writer
                .write_node(&seed, entity.uuid())
                .map_err(SiloError::DumpWrite)?;

            let mut stack = vec![seed];
            while let Some(current) = stack.pop() {
                let neighbors = snapshot
                    .pull_all(&current)
                    .map_err(SiloError::reading_persisted)?;
                for neighbor in neighbors {
                    if entity.append(neighbor.clone()) {
                        writer
                            .write_node(&neighbor, entity.uuid())
                            .map_err(SiloError::DumpWrite)?;
                        stack.push(neighbor);
                    }
                }
            }

            trace!(uuid = entity.uuid(), nodes = entity.len(), "entity traversed");
            let (status, counts) = entity.finalize();
            observer.on_entity(status, &counts);
        }

        writer.flush().map_err(SiloError::DumpWrite)?;
        Ok(())
    }

    /// Flush and release the backend.
    pub fn close(self) -> Result<()> {
        self.backend.close()
    }
}
