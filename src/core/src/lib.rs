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

//! The SILO reconciliation engine.
//!
//! Rows are scanned into equivalence links between `(column, value)` nodes,
//! persisted through a [`Backend`], then drained entity by entity through a
//! destructive [`Snapshot`] during dump. The [`Driver`] owns the backend
//! for its whole lifetime and orchestrates both loops.

pub mod config;
pub mod driven;
pub mod driver;
pub mod entity;
pub mod memory;
pub mod scan;
pub mod test_utils;

pub use config::{Config, ConfigBuilder};
pub use driven::{Backend, DataRowReader, DumpWriter, NoopObserver, Observer, Snapshot};
pub use driver::Driver;
pub use entity::{Entity, Status};
pub use memory::MemoryBackend;
